//! Controller configuration
//!
//! Defines the reserved key prefix and the concurrency limits of the
//! reconciliation workers.

use triggers_filter::{DEFAULT_PREFIX, TriggerKeys};

/// Controller configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix for every label and annotation the triggers write
    pub prefix: String,

    /// Max reconciliations running at the same time
    pub max_parallel_reconciles: usize,

    /// How many times a pass is redone after an update conflict
    pub max_conflict_retries: u32,

    /// Capacity of the watch event channel
    pub event_buffer: usize,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(prefix: String) -> Self {
        Self {
            prefix,
            max_parallel_reconciles: 2,
            max_conflict_retries: 5,
            event_buffer: 128,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - TRIGGERS_PREFIX (optional, default: triggers.shipwright.io)
    /// - MAX_PARALLEL_RECONCILES (optional, default: 2)
    /// - MAX_CONFLICT_RETRIES (optional, default: 5)
    /// - EVENT_BUFFER (optional, default: 128)
    pub fn from_env() -> anyhow::Result<Self> {
        let prefix =
            std::env::var("TRIGGERS_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
        let defaults = Self::new(prefix);

        let max_parallel_reconciles = parse_env("MAX_PARALLEL_RECONCILES")?
            .unwrap_or(defaults.max_parallel_reconciles);
        let max_conflict_retries =
            parse_env("MAX_CONFLICT_RETRIES")?.unwrap_or(defaults.max_conflict_retries);
        let event_buffer = parse_env("EVENT_BUFFER")?.unwrap_or(defaults.event_buffer);

        Ok(Self {
            max_parallel_reconciles,
            max_conflict_retries,
            event_buffer,
            ..defaults
        })
    }

    /// Reserved keys derived from the prefix
    pub fn keys(&self) -> TriggerKeys {
        TriggerKeys::with_prefix(self.prefix.clone())
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.prefix.trim().is_empty() {
            anyhow::bail!("prefix cannot be empty");
        }

        if self.prefix.contains('/') {
            anyhow::bail!("prefix must not contain '/'");
        }

        if self.max_parallel_reconciles == 0 {
            anyhow::bail!("max_parallel_reconciles must be greater than 0");
        }

        if self.event_buffer == 0 {
            anyhow::bail!("event_buffer must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX.to_string())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(None),
    }
}
