//! Radiator Poller
//!
//! Continuously polls heterogeneous CI backends for build status and, on a
//! longer cadence, an issue tracker for validation.
//!
//! Architecture:
//! - Configuration: process-wide cadences, transport limits, safety knobs
//! - Store: read-side boundary to the tracked-entity persistence layer
//! - Strategies: per-backend request shaping and authentication
//! - Scheduler: workload lifecycle from creation to completion or failure
//!
//! The poller assembles one workload per entity per cycle, issues its jobs
//! as concurrent requests, and reports every outcome to the workload
//! handler exactly once.

mod config;
mod handler;
mod scheduler;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use radiator_client::auth::HttpAuthenticator;
use radiator_client::strategy::StrategySet;
use radiator_client::transport::HttpTransport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handler::TracingHandler;
use crate::scheduler::Poller;
use crate::store::StaticEntityStore;

#[derive(Debug, Parser)]
#[command(
    name = "radiator-poller",
    about = "Polls CI backends and an issue tracker for build status"
)]
struct Args {
    /// Path to the JSON file listing tracked entities
    #[arg(long, env = "ENTITIES_FILE")]
    entities: Option<PathBuf>,

    /// Execute one polling pass of each kind, wait for outcomes, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radiator_poller=info,radiator_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Radiator Poller");

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(entities) = args.entities {
        config.entities_file = entities;
    }
    config.validate()?;

    info!(
        "Loaded configuration: entities_file={}, poll_interval={:?}, tracker_poll_interval={:?}",
        config.entities_file.display(),
        config.poll_interval,
        config.tracker_poll_interval
    );

    let transport_config = config.transport_config();
    let transport = Arc::new(
        HttpTransport::new(&transport_config).context("Failed to build HTTP transport")?,
    );
    let authenticator = Arc::new(
        HttpAuthenticator::new(&transport_config).context("Failed to build authenticator")?,
    );
    let strategies = StrategySet::new(transport, authenticator);

    let store = Arc::new(
        StaticEntityStore::load(&config.entities_file)
            .context("Failed to load tracked entities")?,
    );
    info!("Tracking {} entity(ies)", store.len());
    if store.is_empty() {
        warn!("Entity store is empty, nothing will be polled");
    }

    let poller = Poller::new(config.clone(), store, strategies, Arc::new(TracingHandler));

    if args.once {
        info!("Running one polling pass of each kind");
        poller.run_once().await?;
        drain(&poller, config.workload_timeout).await;
        return Ok(());
    }

    poller.run().await
}

/// Waits for the active set to empty so a one-shot run reports outcomes
///
/// Bounded by the workload timeout; anything still unresolved at the
/// deadline is reported and abandoned.
async fn drain(poller: &Poller, deadline: Duration) {
    let started = std::time::Instant::now();

    while poller.active_count() > 0 {
        if started.elapsed() >= deadline {
            warn!(
                "{} workload(s) still unresolved at exit",
                poller.active_count()
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
