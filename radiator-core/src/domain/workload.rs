//! Workload state machine
//!
//! A workload tracks one polling cycle for one entity: the fixed set of
//! jobs that must be fetched, and the results stored so far. Jobs may
//! complete in any order; the workload is complete once every job has a
//! stored result.

use std::collections::HashMap;
use uuid::Uuid;

/// One named fetch required to determine an entity's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Job id, unique within the workload
    pub id: String,
    /// Target to fetch for this job
    pub target: String,
}

/// The jobs and partial results for one entity's current polling cycle
///
/// Jobs are added before any request is issued and never change afterward
/// for that cycle. Results arrive incrementally and only for known job ids,
/// so the result set is always a subset of the job set.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Identifier for this cycle; a new workload always gets a fresh id
    pub id: Uuid,
    /// Key of the entity this workload belongs to
    pub entity_key: String,
    /// When this cycle started
    pub created_at: chrono::DateTime<chrono::Utc>,
    jobs: HashMap<String, JobSpec>,
    results: HashMap<String, String>,
}

impl Workload {
    /// Creates an empty workload for an entity
    pub fn new(entity_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_key: entity_key.into(),
            created_at: chrono::Utc::now(),
            jobs: HashMap::new(),
            results: HashMap::new(),
        }
    }

    /// Adds a job to this workload
    ///
    /// Must only be called while assembling the workload, before any
    /// request has been issued for it.
    pub fn add_job(&mut self, id: impl Into<String>, target: impl Into<String>) {
        let id = id.into();
        let target = target.into();
        self.jobs.insert(id.clone(), JobSpec { id, target });
    }

    /// Looks up a job by id
    pub fn job(&self, id: &str) -> Option<&JobSpec> {
        self.jobs.get(id)
    }

    /// All jobs in this workload
    pub fn jobs(&self) -> &HashMap<String, JobSpec> {
        &self.jobs
    }

    /// Stores the raw response payload for a completed job
    ///
    /// Returns `false` (and stores nothing) when the job id is not part of
    /// this workload, keeping the result set a subset of the job set.
    pub fn store_result(&mut self, id: &str, body: impl Into<String>) -> bool {
        if !self.jobs.contains_key(id) {
            return false;
        }
        self.results.insert(id.to_string(), body.into());
        true
    }

    /// Results stored so far, keyed by job id
    pub fn results(&self) -> &HashMap<String, String> {
        &self.results
    }

    /// Whether every job has produced a stored result
    ///
    /// A workload with no jobs is trivially complete.
    pub fn is_complete(&self) -> bool {
        self.jobs.keys().all(|id| self.results.contains_key(id))
    }

    /// Job ids that still need a request issued, sorted for determinism
    pub fn unfinished(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .jobs
            .keys()
            .filter(|id| !self.results.contains_key(*id))
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_job_workload() -> Workload {
        let mut workload = Workload::new("proj");
        workload.add_job("a", "http://ci.example.com/feed");
        workload.add_job("b", "http://ci.example.com/status");
        workload
    }

    #[test]
    fn test_partial_result_is_not_complete() {
        let mut workload = two_job_workload();
        assert!(!workload.is_complete());

        assert!(workload.store_result("a", "<feed/>"));
        assert!(!workload.is_complete());
        assert_eq!(workload.unfinished(), vec!["b".to_string()]);
    }

    #[test]
    fn test_completes_in_either_order() {
        for order in [["a", "b"], ["b", "a"]] {
            let mut workload = two_job_workload();
            assert!(workload.store_result(order[0], "first"));
            assert!(!workload.is_complete());
            assert!(workload.store_result(order[1], "second"));
            assert!(workload.is_complete());
            assert!(workload.unfinished().is_empty());
        }
    }

    #[test]
    fn test_unknown_job_result_is_rejected() {
        let mut workload = two_job_workload();
        assert!(!workload.store_result("c", "stray"));
        assert!(workload.results().is_empty());
        for id in workload.results().keys() {
            assert!(workload.jobs().contains_key(id));
        }
    }

    #[test]
    fn test_empty_workload_is_trivially_complete() {
        let workload = Workload::new("proj");
        assert!(workload.is_complete());
        assert!(workload.unfinished().is_empty());
    }

    #[test]
    fn test_fresh_workloads_get_distinct_ids() {
        let first = Workload::new("proj");
        let second = Workload::new("proj");
        assert_ne!(first.id, second.id);
    }
}
