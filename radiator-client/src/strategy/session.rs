//! Session-token polling strategy
//!
//! Serves backends that require a session-token exchange before each fetch.
//! A fetch is two async steps, authenticate then request, but surfaces to
//! the scheduler as a single resolution: the payload, or one failure. An
//! authentication failure terminates the containing workload exactly like
//! a transport failure would.

use crate::auth::Authenticator;
use crate::error::{AuthError, PollError};
use crate::request::{COOKIE_HEADER, RequestSpec};
use crate::strategy::Strategy;
use crate::transport::{PollResponse, Transport};
use async_trait::async_trait;
use radiator_core::domain::entity::Entity;
use radiator_core::domain::workload::Workload;
use reqwest::Url;
use std::sync::Arc;

/// Strategy for session-token backends
///
/// The entity's targets name its tracked pipelines, one job each.
pub struct SessionStrategy {
    transport: Arc<dyn Transport>,
    authenticator: Arc<dyn Authenticator>,
}

impl SessionStrategy {
    /// Creates a session strategy over a transport and authenticator
    pub fn new(transport: Arc<dyn Transport>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            transport,
            authenticator,
        }
    }
}

#[async_trait]
impl Strategy for SessionStrategy {
    fn build_workload(&self, entity: &Entity) -> Workload {
        let mut workload = Workload::new(&entity.key);
        for target in &entity.targets {
            workload.add_job(&target.name, &target.url);
        }
        workload
    }

    async fn fetch(&self, entity: &Entity, url: Url) -> Result<PollResponse, PollError> {
        let auth_url = entity
            .auth_url
            .as_deref()
            .ok_or_else(|| AuthError::NotConfigured(entity.key.clone()))?;
        let credentials = entity
            .credentials
            .as_ref()
            .ok_or_else(|| AuthError::NotConfigured(entity.key.clone()))?;

        let token = self
            .authenticator
            .authenticate(auth_url, &credentials.username, &credentials.password)
            .await?;

        let request = RequestSpec::get(url)
            .with_header(COOKIE_HEADER, format!("token={}", token.as_str()))
            .with_accept(entity.accept.as_deref());

        Ok(self.transport.fetch(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionToken;
    use crate::error::TransportError;
    use crate::request::{ACCEPT_HEADER, normalize_target};
    use radiator_core::domain::entity::{BackendKind, Credentials, Target};
    use std::sync::Mutex;

    /// Shared event log proving the relative order of auth and fetch
    type EventLog = Arc<Mutex<Vec<String>>>;

    struct RecordingTransport {
        events: EventLog,
        requests: Mutex<Vec<RequestSpec>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn fetch(&self, request: RequestSpec) -> Result<PollResponse, TransportError> {
            self.events.lock().unwrap().push("fetch".to_string());
            self.requests.lock().unwrap().push(request);
            Ok(PollResponse {
                status: 200,
                body: "ok".to_string(),
            })
        }
    }

    struct ScriptedAuthenticator {
        events: EventLog,
        outcome: Result<String, ()>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Authenticator for ScriptedAuthenticator {
        async fn authenticate(
            &self,
            auth_url: &str,
            username: &str,
            password: &str,
        ) -> Result<SessionToken, AuthError> {
            self.events.lock().unwrap().push("auth".to_string());
            self.calls.lock().unwrap().push((
                auth_url.to_string(),
                username.to_string(),
                password.to_string(),
            ));
            match &self.outcome {
                Ok(token) => Ok(SessionToken::new(token.clone())),
                Err(()) => Err(AuthError::Denied {
                    status: 401,
                    message: "bad credentials".to_string(),
                }),
            }
        }
    }

    fn entity() -> Entity {
        Entity {
            key: "pipelines".to_string(),
            backend: BackendKind::Session,
            targets: vec![
                Target::new("main", "ci.example.com/pipelines/main"),
                Target::new("release", "ci.example.com/pipelines/release"),
            ],
            credentials: Some(Credentials::new("me", "pw")),
            accept: Some("application/json".to_string()),
            auth_url: Some("http://ci.example.com/auth".to_string()),
        }
    }

    fn fixture(
        outcome: Result<String, ()>,
    ) -> (
        SessionStrategy,
        Arc<RecordingTransport>,
        Arc<ScriptedAuthenticator>,
        EventLog,
    ) {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(RecordingTransport {
            events: Arc::clone(&events),
            requests: Mutex::new(Vec::new()),
        });
        let authenticator = Arc::new(ScriptedAuthenticator {
            events: Arc::clone(&events),
            outcome,
            calls: Mutex::new(Vec::new()),
        });
        let strategy = SessionStrategy::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&authenticator) as Arc<dyn Authenticator>,
        );
        (strategy, transport, authenticator, events)
    }

    #[test]
    fn test_one_job_per_pipeline() {
        let (strategy, _, _, _) = fixture(Ok("tok".to_string()));
        let workload = strategy.build_workload(&entity());
        assert_eq!(workload.jobs().len(), 2);
        assert!(workload.job("main").is_some());
        assert!(workload.job("release").is_some());
    }

    #[tokio::test]
    async fn test_authenticates_before_fetching() {
        let (strategy, transport, authenticator, events) = fixture(Ok("tok-123".to_string()));
        let url = normalize_target("ci.example.com/pipelines/main").unwrap();

        strategy.fetch(&entity(), url).await.unwrap();

        assert_eq!(*events.lock().unwrap(), vec!["auth", "fetch"]);
        assert_eq!(
            authenticator.calls.lock().unwrap()[0],
            (
                "http://ci.example.com/auth".to_string(),
                "me".to_string(),
                "pw".to_string()
            )
        );

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header(COOKIE_HEADER), Some("token=tok-123"));
        assert_eq!(requests[0].header(ACCEPT_HEADER), Some("application/json"));
        assert!(requests[0].basic_auth.is_none());
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_without_fetching() {
        let (strategy, transport, _, events) = fixture(Err(()));
        let url = normalize_target("ci.example.com/pipelines/main").unwrap();

        let err = strategy.fetch(&entity(), url).await.expect_err("must fail");

        assert!(err.is_auth_failure());
        assert!(transport.requests.lock().unwrap().is_empty());
        assert_eq!(*events.lock().unwrap(), vec!["auth"]);
    }

    #[tokio::test]
    async fn test_missing_auth_config_is_an_auth_failure() {
        let (strategy, _, _, _) = fixture(Ok("tok".to_string()));
        let mut entity = entity();
        entity.auth_url = None;

        let url = normalize_target("ci.example.com/pipelines/main").unwrap();
        let err = strategy.fetch(&entity, url).await.expect_err("must fail");
        assert!(err.is_auth_failure());
    }
}
