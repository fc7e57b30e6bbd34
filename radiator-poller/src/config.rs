//! Poller configuration
//!
//! Defines all configurable parameters for the poller: the two polling
//! cadences, process-wide transport limits, and the workload safety knobs.
//! Everything is fixed at process start; nothing here is per-entity.

use radiator_client::transport::TransportConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Poller configuration
///
/// All intervals and timeouts are configurable to allow tuning for
/// different deployment scenarios (dev vs prod, fast vs slow backends).
#[derive(Debug, Clone)]
pub struct Config {
    /// How often to poll CI backends
    pub poll_interval: Duration,

    /// How often to poll the issue tracker
    pub tracker_poll_interval: Duration,

    /// Maximum time to establish a connection
    pub connect_timeout: Duration,

    /// Maximum read inactivity before a request is abandoned
    pub idle_timeout: Duration,

    /// Maximum redirect hops to follow
    pub max_redirects: usize,

    /// Age after which an incomplete workload is failed by the watchdog
    pub workload_timeout: Duration,

    /// Request-construction failures tolerated per job before the
    /// workload fails
    pub max_parse_failures: u32,

    /// Path to the JSON file listing tracked entities
    pub entities_file: PathBuf,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(entities_file: PathBuf) -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            tracker_poll_interval: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            max_redirects: 5,
            workload_timeout: Duration::from_secs(600),
            max_parse_failures: 3,
            entities_file,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - ENTITIES_FILE (optional, default: entities.json)
    /// - POLL_INTERVAL (optional, seconds, default: 10)
    /// - TRACKER_POLL_INTERVAL (optional, seconds, default: 300)
    /// - CONNECT_TIMEOUT (optional, seconds, default: 15)
    /// - IDLE_TIMEOUT (optional, seconds, default: 60)
    /// - MAX_REDIRECTS (optional, default: 5)
    /// - WORKLOAD_TIMEOUT (optional, seconds, default: 600)
    /// - MAX_PARSE_FAILURES (optional, default: 3)
    pub fn from_env() -> Self {
        let entities_file = std::env::var("ENTITIES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("entities.json"));

        let mut config = Self::new(entities_file);

        if let Some(secs) = env_secs("POLL_INTERVAL") {
            config.poll_interval = secs;
        }
        if let Some(secs) = env_secs("TRACKER_POLL_INTERVAL") {
            config.tracker_poll_interval = secs;
        }
        if let Some(secs) = env_secs("CONNECT_TIMEOUT") {
            config.connect_timeout = secs;
        }
        if let Some(secs) = env_secs("IDLE_TIMEOUT") {
            config.idle_timeout = secs;
        }
        if let Some(n) = env_parse::<usize>("MAX_REDIRECTS") {
            config.max_redirects = n;
        }
        if let Some(secs) = env_secs("WORKLOAD_TIMEOUT") {
            config.workload_timeout = secs;
        }
        if let Some(n) = env_parse::<u32>("MAX_PARSE_FAILURES") {
            config.max_parse_failures = n;
        }

        config
    }

    /// The transport parameters carved out of this configuration
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            idle_timeout: self.idle_timeout,
            max_redirects: self.max_redirects,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.tracker_poll_interval.as_secs() == 0 {
            anyhow::bail!("tracker_poll_interval must be greater than 0");
        }

        if self.connect_timeout.as_secs() == 0 {
            anyhow::bail!("connect_timeout must be greater than 0");
        }

        if self.idle_timeout.as_secs() == 0 {
            anyhow::bail!("idle_timeout must be greater than 0");
        }

        if self.workload_timeout.as_secs() == 0 {
            anyhow::bail!("workload_timeout must be greater than 0");
        }

        if self.max_parse_failures == 0 {
            anyhow::bail!("max_parse_failures must be greater than 0");
        }

        if self.entities_file.as_os_str().is_empty() {
            anyhow::bail!("entities_file cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("entities.json"))
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse::<T>().ok())
}
