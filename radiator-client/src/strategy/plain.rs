//! Direct-credential polling strategy
//!
//! Serves backends that accept plain authenticated requests: every target
//! becomes one job, and each fetch carries basic auth when the entity has
//! credentials, plus an `Accept` header when it declares a content type.
//! No separate authentication round-trip.

use crate::error::PollError;
use crate::request::RequestSpec;
use crate::strategy::Strategy;
use crate::transport::{PollResponse, Transport};
use async_trait::async_trait;
use radiator_core::domain::entity::Entity;
use radiator_core::domain::workload::Workload;
use reqwest::Url;
use std::sync::Arc;

/// Strategy for plain basic-auth backends
pub struct PlainStrategy {
    transport: Arc<dyn Transport>,
}

impl PlainStrategy {
    /// Creates a plain strategy over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Strategy for PlainStrategy {
    fn build_workload(&self, entity: &Entity) -> Workload {
        let mut workload = Workload::new(&entity.key);
        for target in &entity.targets {
            workload.add_job(&target.name, &target.url);
        }
        workload
    }

    async fn fetch(&self, entity: &Entity, url: Url) -> Result<PollResponse, PollError> {
        let mut request = RequestSpec::get(url).with_accept(entity.accept.as_deref());

        if let Some(credentials) = entity.basic_auth() {
            request = request.with_basic_auth(credentials.clone());
        }

        Ok(self.transport.fetch(request).await?)
    }
}
