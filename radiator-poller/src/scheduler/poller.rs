//! Workload poller
//!
//! Polls every due entity on its cadence and fans each workload's jobs out
//! as concurrent requests. Responses come back in any order; the poller
//! stores them, checks completion, and notifies the handler exactly once
//! per workload outcome. A single job failure fails the whole workload for
//! that cycle; the next cycle starts fresh.

use anyhow::{Context as AnyhowContext, Result};
use radiator_client::error::PollError;
use radiator_client::request::normalize_target;
use radiator_client::strategy::StrategySet;
use radiator_client::transport::PollResponse;
use radiator_core::domain::entity::{Entity, PollClass};
use radiator_core::domain::workload::Workload;
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::time;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::handler::WorkloadHandler;
use crate::store::EntityStore;

/// An entry in the active workload set
///
/// Wraps the workload state machine with scheduler bookkeeping: which jobs
/// have a request on the wire, and how often each job has failed request
/// construction.
struct ActiveWorkload {
    workload: Workload,
    in_flight: HashSet<String>,
    parse_failures: HashMap<String, u32>,
    started: Instant,
}

impl ActiveWorkload {
    fn new(workload: Workload) -> Self {
        Self {
            workload,
            in_flight: HashSet::new(),
            parse_failures: HashMap::new(),
            started: Instant::now(),
        }
    }
}

type ActiveSet = Mutex<HashMap<String, ActiveWorkload>>;

/// Workload poller that continuously polls tracked entities
///
/// The active workload set is owned here; it is only touched inside short
/// lock scopes, and get-or-create is the sole insertion point, so there is
/// never more than one workload per entity.
pub struct Poller {
    config: Config,
    store: Arc<dyn EntityStore>,
    strategies: StrategySet,
    handler: Arc<dyn WorkloadHandler>,
    active: Arc<ActiveSet>,
}

impl Poller {
    /// Creates a new poller
    pub fn new(
        config: Config,
        store: Arc<dyn EntityStore>,
        strategies: StrategySet,
        handler: Arc<dyn WorkloadHandler>,
    ) -> Self {
        Self {
            config,
            store,
            strategies,
            handler,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts the polling loop
    ///
    /// Two independent timers drive the loop: a short-period tick for CI
    /// backends and a long-period tick for the issue tracker. Pass-level
    /// errors are logged and never abort the loop.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting poller (ci interval: {:?}, tracker interval: {:?})",
            self.config.poll_interval, self.config.tracker_poll_interval
        );

        let mut ci_ticks = time::interval(self.config.poll_interval);
        let mut tracker_ticks = time::interval(self.config.tracker_poll_interval);

        loop {
            tokio::select! {
                _ = ci_ticks.tick() => {
                    if let Err(e) = self.poll_class(PollClass::Ci).await {
                        error!("Error during CI poll cycle: {:#}", e);
                    }
                }
                _ = tracker_ticks.tick() => {
                    if let Err(e) = self.poll_class(PollClass::Tracker).await {
                        error!("Error during tracker poll cycle: {:#}", e);
                    }
                }
            }
        }
    }

    /// Executes exactly one tick of each kind and returns
    ///
    /// Requests issued by the passes resolve in the background; callers
    /// that need the outcomes watch the handler or the active count.
    pub async fn run_once(&self) -> Result<()> {
        self.poll_class(PollClass::Ci).await?;
        self.poll_class(PollClass::Tracker).await?;
        Ok(())
    }

    /// Number of workloads currently in flight
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Performs a single poll pass for one cadence class
    async fn poll_class(&self, class: PollClass) -> Result<()> {
        self.expire_stalled();

        let entities = self
            .store
            .due_for_poll(class)
            .await
            .context("Failed to enumerate due entities")?;

        if entities.is_empty() {
            debug!("No entities due for {:?} polling", class);
            return Ok(());
        }

        debug!("Polling {} entity(ies) for {:?}", entities.len(), class);

        for entity in entities {
            self.poll_entity(entity);
        }

        Ok(())
    }

    /// Polls one entity: get-or-create its workload and issue what is due
    fn poll_entity(&self, entity: Entity) {
        let entity = Arc::new(entity);
        let strategy = self.strategies.for_backend(entity.backend);

        let mut created_snapshot = None;
        let mut poison = None;

        let (workload_id, to_issue) = {
            let mut active = self.active.lock().unwrap();
            let entry = active.entry(entity.key.clone()).or_insert_with(|| {
                let workload = strategy.build_workload(&entity);
                debug!(
                    "Created workload {} for {} with {} job(s)",
                    workload.id,
                    entity.key,
                    workload.jobs().len()
                );
                created_snapshot = Some(workload.clone());
                ActiveWorkload::new(workload)
            });

            let workload_id = entry.workload.id;
            let mut to_issue: Vec<(String, Url)> = Vec::new();

            for job_id in entry.workload.unfinished() {
                if entry.in_flight.contains(&job_id) {
                    debug!("Job {} for {} still in flight, not re-issued", job_id, entity.key);
                    continue;
                }

                let Some(target) = entry.workload.job(&job_id).map(|job| job.target.clone())
                else {
                    continue;
                };

                match normalize_target(&target) {
                    Ok(url) => {
                        entry.in_flight.insert(job_id.clone());
                        to_issue.push((job_id, url));
                    }
                    Err(e) => {
                        let failures = entry.parse_failures.entry(job_id.clone()).or_insert(0);
                        *failures += 1;
                        warn!(
                            "Skipping job {} for {} this pass ({} construction failure(s)): {}",
                            job_id, entity.key, failures, e
                        );
                        if *failures >= self.config.max_parse_failures {
                            poison = Some(PollError::MalformedTarget { target });
                        }
                    }
                }
            }

            (workload_id, to_issue)
        };

        // Creation is reported before any request goes out, so the handler
        // can record the expected job count first.
        if let Some(workload) = created_snapshot {
            self.handler.on_created(&workload);
        }

        if let Some(error) = poison {
            Self::fail_workload(&self.active, self.handler.as_ref(), &entity.key, workload_id, error);
            return;
        }

        // An entity with no targets is trivially complete and never enters
        // a request.
        let finished_empty = {
            let mut active = self.active.lock().unwrap();
            let complete = active
                .get(&entity.key)
                .is_some_and(|entry| entry.workload.id == workload_id && entry.workload.is_complete());
            if complete { active.remove(&entity.key) } else { None }
        };
        if let Some(entry) = finished_empty {
            self.handler.on_complete(&entry.workload);
            return;
        }

        for (job_id, url) in to_issue {
            debug!("Issuing request for job {} of {}: {}", job_id, entity.key, url);

            let strategy = Arc::clone(&strategy);
            let entity = Arc::clone(&entity);
            let active = Arc::clone(&self.active);
            let handler = Arc::clone(&self.handler);

            tokio::spawn(async move {
                match strategy.fetch(&entity, url).await {
                    Ok(response) => Self::finish_job(
                        &active,
                        handler.as_ref(),
                        &entity.key,
                        workload_id,
                        &job_id,
                        response,
                    ),
                    Err(error) => Self::fail_workload(
                        &active,
                        handler.as_ref(),
                        &entity.key,
                        workload_id,
                        error,
                    ),
                }
            });
        }
    }

    /// Stores one job's result and finalizes the workload when it completes
    ///
    /// The completion check runs strictly after the result is stored, and
    /// the workload leaves the active set in the same lock scope that
    /// observes completion, so only one resolution can ever finalize it.
    /// Responses for a cycle that has already been discarded are dropped.
    fn finish_job(
        active: &ActiveSet,
        handler: &dyn WorkloadHandler,
        entity_key: &str,
        workload_id: Uuid,
        job_id: &str,
        response: PollResponse,
    ) {
        let finished = {
            let mut active = active.lock().unwrap();
            let complete = match active.get_mut(entity_key) {
                Some(entry) if entry.workload.id == workload_id => {
                    entry.in_flight.remove(job_id);
                    if entry.workload.store_result(job_id, response.body) {
                        entry.workload.is_complete()
                    } else {
                        warn!("Dropping result for unknown job {} of {}", job_id, entity_key);
                        false
                    }
                }
                _ => {
                    debug!("Dropping late response for job {} of {}", job_id, entity_key);
                    false
                }
            };
            if complete {
                active.remove(entity_key).map(|entry| entry.workload)
            } else {
                None
            }
        };

        if let Some(workload) = finished {
            debug!("Workload {} for {} complete", workload.id, entity_key);
            handler.on_complete(&workload);
        }
    }

    /// Fails a workload as a whole and discards it
    ///
    /// Invoked on any job failure: sibling jobs may already have succeeded
    /// or still be in flight; their late resolutions find no matching
    /// workload and are dropped, so the handler hears about the failure at
    /// most once.
    fn fail_workload(
        active: &ActiveSet,
        handler: &dyn WorkloadHandler,
        entity_key: &str,
        workload_id: Uuid,
        error: PollError,
    ) {
        let removed = {
            let mut active = active.lock().unwrap();
            let matches = active
                .get(entity_key)
                .is_some_and(|entry| entry.workload.id == workload_id);
            if matches { active.remove(entity_key) } else { None }
        };

        match removed {
            Some(entry) => {
                warn!(
                    "Workload {} for {} failed: {}",
                    entry.workload.id, entity_key, error
                );
                handler.on_failed(&entry.workload, &error);
            }
            None => {
                debug!(
                    "Dropping failure for already finalized workload of {}: {}",
                    entity_key, error
                );
            }
        }
    }

    /// Fails workloads that have outlived the watchdog deadline
    ///
    /// A request the transport never resolves would otherwise pin its
    /// workload in the active set forever.
    fn expire_stalled(&self) {
        let timeout = self.config.workload_timeout;

        let expired: Vec<ActiveWorkload> = {
            let mut active = self.active.lock().unwrap();
            let stalled: Vec<String> = active
                .iter()
                .filter(|(_, entry)| entry.started.elapsed() >= timeout)
                .map(|(key, _)| key.clone())
                .collect();
            stalled
                .into_iter()
                .filter_map(|key| active.remove(&key))
                .collect()
        };

        for entry in expired {
            let error = PollError::Stalled {
                age_secs: entry.started.elapsed().as_secs(),
            };
            warn!(
                "Expiring stalled workload {} for {}",
                entry.workload.id, entry.workload.entity_key
            );
            self.handler.on_failed(&entry.workload, &error);
        }
    }
}
