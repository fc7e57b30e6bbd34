//! Core domain types
//!
//! This module contains the domain structures used across Radiator services.
//! Entities describe what gets polled and how; workloads track the state of
//! one polling cycle for one entity.

pub mod entity;
pub mod workload;
