use std::time::Duration;

use mkt_config::{ReconnectConfig, ReconnectStrategy};

const DEFAULT_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// How long to wait before each reconnect attempt, and when to stop.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconnectPolicy {
    /// Unexpected closure leaves the connection disconnected
    Never,
    Fixed {
        delay: Duration,
        max_attempts: u32,
    },
    Exponential {
        initial: Duration,
        max_delay: Duration,
        multiplier: f64,
        max_attempts: u32,
        /// Scale each delay by a random factor in 0.5..1.5
        jitter: bool,
    },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Fixed {
            delay: DEFAULT_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        match config.strategy {
            ReconnectStrategy::Never => Self::Never,
            ReconnectStrategy::Fixed => Self::Fixed {
                delay: Duration::from_millis(config.delay_ms),
                max_attempts: config.max_attempts,
            },
            ReconnectStrategy::Exponential => Self::Exponential {
                initial: Duration::from_millis(config.delay_ms),
                max_delay: Duration::from_millis(config.max_delay_ms),
                multiplier: config.multiplier,
                max_attempts: config.max_attempts,
                jitter: config.jitter,
            },
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self::Fixed {
            delay,
            max_attempts,
        }
    }

    /// Delay before reconnect attempt `attempt` (1-based), `None` once the
    /// policy gives up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Fixed {
                delay,
                max_attempts,
            } => (attempt >= 1 && attempt <= *max_attempts).then_some(*delay),
            Self::Exponential {
                initial,
                max_delay,
                multiplier,
                max_attempts,
                jitter,
            } => {
                if attempt == 0 || attempt > *max_attempts {
                    return None;
                }

                let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
                let base = (initial.as_secs_f64() * multiplier.powi(exponent))
                    .min(max_delay.as_secs_f64());

                let secs = if *jitter {
                    let jitter_factor = 0.5 + rand::random::<f64>(); // 0.5 to 1.5
                    base * jitter_factor
                } else {
                    base
                };

                // Negative or NaN delays come from a multiplier below zero
                Some(Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(*max_delay))
            }
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::Never => 0,
            Self::Fixed { max_attempts, .. } | Self::Exponential { max_attempts, .. } => {
                *max_attempts
            }
        }
    }
}
