//! Engine configuration, loaded from environment variables with defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an unparsable value {value:?}")]
    InvalidVar { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Depth of the store's main request queue
    pub store_buffer: usize,
    /// Depth of each unit of work's private queue
    pub tx_buffer: usize,
    /// An open unit of work idle for this long is rolled back
    pub tx_idle_timeout: Duration,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_buffer: 100,
            tx_buffer: 32,
            tx_idle_timeout: Duration::from_millis(5000),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the process environment.
    ///
    /// - `SWEETSHOP_STORE_BUFFER` (default 100)
    /// - `SWEETSHOP_TX_BUFFER` (default 32)
    /// - `SWEETSHOP_TX_IDLE_TIMEOUT_MS` (default 5000)
    /// - `SWEETSHOP_LOG` (default `info`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            store_buffer: parse_or(&lookup, "SWEETSHOP_STORE_BUFFER", defaults.store_buffer)?,
            tx_buffer: parse_or(&lookup, "SWEETSHOP_TX_BUFFER", defaults.tx_buffer)?,
            tx_idle_timeout: Duration::from_millis(parse_or(
                &lookup,
                "SWEETSHOP_TX_IDLE_TIMEOUT_MS",
                5000u64,
            )?),
            log_filter: lookup("SWEETSHOP_LOG").unwrap_or(defaults.log_filter),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_buffer == 0 {
            return Err(ConfigError::Zero("store_buffer"));
        }
        if self.tx_buffer == 0 {
            return Err(ConfigError::Zero("tx_buffer"));
        }
        if self.tx_idle_timeout.is_zero() {
            return Err(ConfigError::Zero("tx_idle_timeout"));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { key, value }),
    }
}
