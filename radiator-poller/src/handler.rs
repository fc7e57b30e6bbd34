//! Workload lifecycle notifications
//!
//! The handler is the bridge to whatever records build status downstream.
//! Notifications are synchronous and invoked from the scheduler's
//! completion handling, so implementations must return quickly and must
//! not block on I/O.

use radiator_client::error::PollError;
use radiator_core::domain::workload::Workload;
use tracing::{info, warn};

/// Notification sink for workload lifecycle transitions
///
/// For every workload, `on_created` fires first (before any request is
/// issued), followed by exactly one of `on_complete` or `on_failed`.
pub trait WorkloadHandler: Send + Sync {
    /// A workload was created for an entity's polling cycle
    fn on_created(&self, workload: &Workload);

    /// Every job in the workload produced a result
    fn on_complete(&self, workload: &Workload);

    /// The workload failed as a whole; partial results are dropped
    fn on_failed(&self, workload: &Workload, error: &PollError);
}

/// Handler that reports lifecycle transitions through tracing
///
/// The default sink for the binary; real deployments substitute a handler
/// that records results into the status store.
pub struct TracingHandler;

impl WorkloadHandler for TracingHandler {
    fn on_created(&self, workload: &Workload) {
        info!(
            "Workload {} created for {} ({} job(s))",
            workload.id,
            workload.entity_key,
            workload.jobs().len()
        );
    }

    fn on_complete(&self, workload: &Workload) {
        info!(
            "Workload {} for {} completed with {} result(s)",
            workload.id,
            workload.entity_key,
            workload.results().len()
        );
    }

    fn on_failed(&self, workload: &Workload, error: &PollError) {
        warn!(
            "Workload {} for {} failed: {}",
            workload.id, workload.entity_key, error
        );
    }
}
