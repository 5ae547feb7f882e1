use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{err::ConfigError, params::Slippage};

/// Gas parameters attached to every transaction the crate sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Legacy gas price in wei. `None` leaves pricing to the provider.
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { gas_price: Some(12_000_000_000), gas_limit: Some(4_000_000) }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub slippage: Slippage,
    /// Deadline for each outbound call, in milliseconds.
    pub call_timeout_ms: u64,
    pub gas: GasConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { slippage: Slippage::default(), call_timeout_ms: 30_000, gas: GasConfig::default() }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid("call_timeout_ms must be positive".to_string()));
        }
        if self.gas.gas_limit == Some(0) {
            return Err(ConfigError::Invalid("gas_limit must be positive".to_string()));
        }
        Ok(())
    }
}
