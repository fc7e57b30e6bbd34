//! Radiator Core
//!
//! Core types for the Radiator build-status poller.
//!
//! This crate contains:
//! - Domain types: tracked entities, job descriptions, and the per-cycle
//!   workload state machine shared between the client and poller crates.

pub mod domain;
