//! # Node Configuration
//!
//! Unified configuration for the admission pipeline and runtime parameters.
//!
//! Values start from defaults and are overridden from `LN_*` environment
//! variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LN_MAX_TX_FEE` | `submitter.default_max_fee` (base units) |
//! | `LN_MIN_RELAY_FEE` | `mempool.min_relay_fee_per_kb` (base units) |
//! | `LN_MAX_POOL_BYTES` | `mempool.max_pool_bytes` |
//! | `LN_SYNC_TIMEOUT_MS` | `submitter.sync_timeout` (0 = unbounded) |
//! | `LN_LOG_LEVEL` | `log_level` |

use mempool::{Amount, MempoolConfig, SubmitterConfig};
use shared_bus::QueueConfig;
use std::time::Duration;
use tracing::Level;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Pending pool policy.
    pub mempool: MempoolConfig,
    /// Submission defaults.
    pub submitter: SubmitterConfig,
    /// Notification queue.
    pub queue: QueueConfig,
    /// Maximum log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            mempool: MempoolConfig::default(),
            submitter: SubmitterConfig::default(),
            queue: QueueConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Loads defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overridden by `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(sat) = parse_var::<u64, _>(&lookup, "LN_MAX_TX_FEE")? {
            config.submitter.default_max_fee = Amount::from_sat(sat);
        }
        if let Some(sat) = parse_var::<u64, _>(&lookup, "LN_MIN_RELAY_FEE")? {
            config.mempool.min_relay_fee_per_kb = Amount::from_sat(sat);
        }
        if let Some(bytes) = parse_var::<usize, _>(&lookup, "LN_MAX_POOL_BYTES")? {
            config.mempool.max_pool_bytes = bytes;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "LN_SYNC_TIMEOUT_MS")? {
            config.submitter.sync_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(level) = lookup("LN_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Checks cross-field consistency.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the pool cannot hold a single maximum-size transaction
    /// - the pool admits no transactions at all
    /// - the log level is not recognized
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mempool.max_transactions == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_transactions",
                value: "0".to_string(),
            });
        }
        if self.mempool.max_pool_bytes < self.mempool.max_tx_size {
            return Err(ConfigError::PoolSmallerThanTransaction {
                pool_bytes: self.mempool.max_pool_bytes,
                tx_size: self.mempool.max_tx_size,
            });
        }
        self.max_log_level()?;
        Ok(())
    }

    /// Parsed `log_level`.
    pub fn max_log_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "LN_LOG_LEVEL",
                value: self.log_level.clone(),
            })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting could not be parsed or is out of range.
    InvalidValue { key: &'static str, value: String },
    /// `max_pool_bytes` is below `max_tx_size`.
    PoolSmallerThanTransaction { pool_bytes: usize, tx_size: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::PoolSmallerThanTransaction {
                pool_bytes,
                tx_size,
            } => write!(
                f,
                "Mempool capacity ({} bytes) is smaller than the maximum transaction size ({} bytes)",
                pool_bytes, tx_size
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
