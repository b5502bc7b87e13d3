use crate::{ConfigError, ConfigErrorResult, DEFAULT_SERVER_URL};

use serde::Deserialize;
use url::Url;

pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shown when a failed REST call carries no readable message
pub const DEFAULT_FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Configuration for the REST collaborators
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub fallback_error_message: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fallback_error_message: DEFAULT_FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::api(format!(
                "api.base_url is not a valid URL ({}): {e}",
                self.base_url
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::api(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.timeout_secs < MIN_TIMEOUT_SECS || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::api(format!(
                "api.timeout_secs must be {}-{}, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if self.fallback_error_message.trim().is_empty() {
            return Err(ConfigError::api("api.fallback_error_message must not be empty"));
        }

        Ok(())
    }
}
