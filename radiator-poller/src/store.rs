//! Entity store boundary
//!
//! The poller does not own entity persistence; it only asks which entities
//! are due for a given polling pass. The trait keeps the scheduler
//! independent of where entities actually live.

use anyhow::{Context, Result};
use async_trait::async_trait;
use radiator_core::domain::entity::{Entity, PollClass};
use std::path::Path;

/// Read-side boundary to the entity persistence layer
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entities due for polling in the given cadence class
    async fn due_for_poll(&self, class: PollClass) -> Result<Vec<Entity>>;
}

/// Entity store backed by a JSON file loaded once at startup
///
/// Every entity of the requested class is considered due on every pass.
pub struct StaticEntityStore {
    entities: Vec<Entity>,
}

impl StaticEntityStore {
    /// Creates a store over an in-memory entity list
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Loads the entity list from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entities file {}", path.display()))?;

        let entities: Vec<Entity> = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse entities file {}", path.display()))?;

        Ok(Self::new(entities))
    }

    /// Number of entities in the store
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[async_trait]
impl EntityStore for StaticEntityStore {
    async fn due_for_poll(&self, class: PollClass) -> Result<Vec<Entity>> {
        Ok(self
            .entities
            .iter()
            .filter(|entity| entity.backend.poll_class() == class)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiator_core::domain::entity::{BackendKind, Target};

    fn entity(key: &str, backend: BackendKind) -> Entity {
        Entity {
            key: key.to_string(),
            backend,
            targets: vec![Target::new("feed", "ci.example.com/feed")],
            credentials: None,
            accept: None,
            auth_url: None,
        }
    }

    #[tokio::test]
    async fn test_due_filters_by_class() {
        let store = StaticEntityStore::new(vec![
            entity("ci-a", BackendKind::Plain),
            entity("ci-b", BackendKind::Session),
            entity("issues", BackendKind::Tracker),
        ]);

        let ci = store.due_for_poll(PollClass::Ci).await.unwrap();
        assert_eq!(ci.len(), 2);
        assert!(ci.iter().all(|e| e.backend != BackendKind::Tracker));

        let tracker = store.due_for_poll(PollClass::Tracker).await.unwrap();
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker[0].key, "issues");
    }

    #[test]
    fn test_parses_entity_json() {
        let entities: Vec<Entity> = serde_json::from_str(
            r#"[
                {
                    "key": "proj",
                    "backend": "plain",
                    "targets": [
                        {"name": "feed", "url": "ci.example.com/feed"},
                        {"name": "status", "url": "ci.example.com/status"}
                    ],
                    "credentials": {"username": "me", "password": "pw"},
                    "accept": "application/xml"
                },
                {
                    "key": "pipelines",
                    "backend": "session",
                    "targets": [{"name": "main", "url": "ci.example.com/pipelines/main"}],
                    "credentials": {"username": "me", "password": "pw"},
                    "auth_url": "http://ci.example.com/auth"
                }
            ]"#,
        )
        .expect("valid entities");

        let store = StaticEntityStore::new(entities);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
