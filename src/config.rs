use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Smallest exponent size accepted; anything shorter weakens the exchange.
pub const MIN_EXPONENT_BYTES: usize = 180;

/// Tunables for a [`crate::Protocol`] session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolConfig {
    /// How far in the past a client initiation timestamp may be, in seconds.
    pub freshness_window_secs: i64,
    /// Number of random bytes drawn for each ephemeral exponent.
    pub exponent_bytes: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: 5 * 60,
            exponent_bytes: MIN_EXPONENT_BYTES,
        }
    }
}

impl ProtocolConfig {
    /// Override the server-side freshness window.
    pub fn with_freshness_window_secs(mut self, secs: i64) -> Self {
        self.freshness_window_secs = secs;
        self
    }

    /// Override the ephemeral exponent length.
    pub fn with_exponent_bytes(mut self, bytes: usize) -> Self {
        self.exponent_bytes = bytes;
        self
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> ProtocolResult<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| ProtocolError::InvalidConfig(e.to_string()))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ProtocolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProtocolResult<()> {
        if self.exponent_bytes < MIN_EXPONENT_BYTES {
            return Err(ProtocolError::InvalidConfig(format!(
                "exponent_bytes must be at least {MIN_EXPONENT_BYTES}, got {}",
                self.exponent_bytes
            )));
        }
        if self.freshness_window_secs <= 0 {
            return Err(ProtocolError::InvalidConfig(format!(
                "freshness_window_secs must be positive, got {}",
                self.freshness_window_secs
            )));
        }
        Ok(())
    }
}
