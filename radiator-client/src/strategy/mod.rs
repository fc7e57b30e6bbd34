//! Polling strategies
//!
//! Backend-specific logic for one polling cycle: which jobs make up an
//! entity's workload, and how a single authenticated fetch is issued.
//! Strategies are trait-based so the scheduler stays independent of any
//! concrete backend, and dispatch is by the entity's backend discriminator.

mod plain;
mod session;

pub use plain::PlainStrategy;
pub use session::SessionStrategy;

use crate::auth::Authenticator;
use crate::error::PollError;
use crate::transport::{PollResponse, Transport};
use async_trait::async_trait;
use radiator_core::domain::entity::{BackendKind, Entity};
use radiator_core::domain::workload::Workload;
use reqwest::Url;
use std::sync::Arc;

/// Backend-specific polling behavior
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Enumerates the jobs that make up one polling pass for an entity
    fn build_workload(&self, entity: &Entity) -> Workload;

    /// Issues the authenticated fetch for a single job
    ///
    /// Resolves exactly once: the response payload on success, or a typed
    /// failure that terminates the containing workload.
    async fn fetch(&self, entity: &Entity, url: Url) -> Result<PollResponse, PollError>;
}

/// The configured strategy per backend kind
#[derive(Clone)]
pub struct StrategySet {
    plain: Arc<dyn Strategy>,
    session: Arc<dyn Strategy>,
}

impl StrategySet {
    /// Builds the standard strategies on top of a transport and authenticator
    pub fn new(transport: Arc<dyn Transport>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            plain: Arc::new(PlainStrategy::new(Arc::clone(&transport))),
            session: Arc::new(SessionStrategy::new(transport, authenticator)),
        }
    }

    /// Selects the strategy serving a backend kind
    ///
    /// Tracker backends poll with plain requests; only their cadence
    /// differs, which is the scheduler's concern.
    pub fn for_backend(&self, backend: BackendKind) -> Arc<dyn Strategy> {
        match backend {
            BackendKind::Plain | BackendKind::Tracker => Arc::clone(&self.plain),
            BackendKind::Session => Arc::clone(&self.session),
        }
    }
}
