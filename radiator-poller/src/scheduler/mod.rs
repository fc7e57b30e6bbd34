//! Scheduler layer for the poller
//!
//! This layer drives the polling cadence and owns the active workload set.
//! It manages the lifecycle of workloads from creation through completion
//! or failure.

pub mod poller;

pub use poller::Poller;
