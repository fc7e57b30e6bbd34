//! Tracked entity types

use serde::{Deserialize, Serialize};

/// A tracked project/backend configuration polled once per cycle
///
/// Entities are owned by the persistence layer; the poller treats them as
/// read-only input for one polling pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Opaque unique key identifying this entity
    pub key: String,
    /// Which backend variant serves this entity
    pub backend: BackendKind,
    /// Named target URLs, one job each per polling cycle
    #[serde(default)]
    pub targets: Vec<Target>,
    /// Basic-auth credentials, when the backend requires them
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Content type to request via an `Accept` header
    #[serde(default)]
    pub accept: Option<String>,
    /// Authentication endpoint for session-token backends
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl Entity {
    /// Returns the credentials to use for basic auth, if any
    ///
    /// Credentials with an empty username never produce an auth header.
    pub fn basic_auth(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| !c.username.is_empty())
    }
}

/// A named target URL within an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Job id, unique within the entity
    pub name: String,
    /// URL to fetch; a missing scheme is interpreted as `http`
    pub url: String,
}

impl Target {
    /// Creates a named target
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Username/password pair for basic auth and session authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Creates a credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Backend variant discriminator, selects the polling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CI backend polled with direct basic-auth requests
    Plain,
    /// CI backend requiring a session-token exchange before each fetch
    Session,
    /// Issue tracker polled on the long cadence for validation
    Tracker,
}

impl BackendKind {
    /// Maps the backend to the timer cadence that drives it
    pub fn poll_class(self) -> PollClass {
        match self {
            BackendKind::Plain | BackendKind::Session => PollClass::Ci,
            BackendKind::Tracker => PollClass::Tracker,
        }
    }
}

/// Polling cadence class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollClass {
    /// Short-period CI polling
    Ci,
    /// Long-period tracker polling
    Tracker,
}
