use crate::{ConfigError, ConfigErrorResult};

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub const MIN_DELAY_MS: u64 = 100;
pub const MAX_DELAY_MS: u64 = 300_000;
pub const DEFAULT_DELAY_MS: u64 = 5000;

pub const MAX_MAX_DELAY_MS: u64 = 600_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

pub const MIN_MULTIPLIER: f64 = 1.0;
pub const MAX_MULTIPLIER: f64 = 10.0;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 1000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

pub const DEFAULT_JITTER: bool = false;

/// How the realtime client spaces reconnect attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectStrategy {
    /// Same delay before every attempt
    #[default]
    Fixed,
    /// Delay grows by `multiplier` per attempt up to `max_delay_ms`
    Exponential,
    /// Never reconnect automatically
    Never,
}

impl FromStr for ReconnectStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigErrorResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            "never" => Ok(Self::Never),
            other => Err(ConfigError::reconnect(format!(
                "unknown reconnect strategy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ReconnectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "fixed",
            Self::Exponential => "exponential",
            Self::Never => "never",
        };
        write!(f, "{name}")
    }
}

/// Reconnect policy for the realtime channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub strategy: ReconnectStrategy,
    /// Fixed delay, or the first delay for exponential backoff
    pub delay_ms: u64,
    /// Cap for exponential backoff
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Attempts after which the client gives up and reports an error
    pub max_attempts: u32,
    /// Randomize each delay by +/-50%
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            strategy: ReconnectStrategy::default(),
            delay_ms: DEFAULT_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl ReconnectConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.strategy == ReconnectStrategy::Never {
            return Ok(());
        }

        if self.delay_ms < MIN_DELAY_MS || self.delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::reconnect(format!(
                "reconnect.delay_ms must be {}-{}, got {}",
                MIN_DELAY_MS, MAX_DELAY_MS, self.delay_ms
            )));
        }

        if self.max_delay_ms < self.delay_ms || self.max_delay_ms > MAX_MAX_DELAY_MS {
            return Err(ConfigError::reconnect(format!(
                "reconnect.max_delay_ms must be {}-{}, got {}",
                self.delay_ms, MAX_MAX_DELAY_MS, self.max_delay_ms
            )));
        }

        if !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&self.multiplier) {
            return Err(ConfigError::reconnect(format!(
                "reconnect.multiplier must be {}-{}, got {}",
                MIN_MULTIPLIER, MAX_MULTIPLIER, self.multiplier
            )));
        }

        if self.max_attempts < MIN_MAX_ATTEMPTS || self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(ConfigError::reconnect(format!(
                "reconnect.max_attempts must be {}-{}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, self.max_attempts
            )));
        }

        Ok(())
    }
}
