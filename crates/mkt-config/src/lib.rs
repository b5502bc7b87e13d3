mod api_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod realtime_config;
mod reconnect_config;

#[cfg(test)]
mod tests;

pub use api_config::ApiConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use realtime_config::RealtimeConfig;
pub use reconnect_config::{ReconnectConfig, ReconnectStrategy};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const CONFIG_DIR_ENV: &str = "MKT_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".mkt";
const CONFIG_FILE_NAME: &str = "config.toml";
