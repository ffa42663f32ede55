use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Route the receive screen falls back to when the displayed address is stale.
pub const DEFAULT_WALLET_ROUTE: &str = "/wallet/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed receive config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reveal cadence must be at least 1 frame")]
    ZeroCadence,
    #[error("reveal decay step must be non-zero")]
    ZeroStep,
}

/// Pacing of the address reveal animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Raw display frames per decay tick.
    pub cadence: u32,
    /// Amount subtracted from every scramble magnitude on a decay tick.
    pub step: u8,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            cadence: 4,
            step: 15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveConfig {
    pub reveal: RevealConfig,
    pub wallet_route: String,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            wallet_route: DEFAULT_WALLET_ROUTE.to_string(),
        }
    }
}

impl ReceiveConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Compile-time override via `TROVE_RECEIVE_CONFIG` (a JSON document).
    /// Falls back to defaults when unset or invalid.
    pub fn from_env() -> Self {
        match option_env!("TROVE_RECEIVE_CONFIG") {
            Some(raw) => Self::from_json(raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring TROVE_RECEIVE_CONFIG: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal.cadence == 0 {
            return Err(ConfigError::ZeroCadence);
        }
        if self.reveal.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        Ok(())
    }
}
