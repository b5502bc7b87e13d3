use crate::{
    ApiConfig, CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, LoggingConfig, RealtimeConfig, ReconnectConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub realtime: RealtimeConfig,
    pub reconnect: ReconnectConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Loading order:
    /// 1. MKT_CONFIG_DIR env var, else ./.mkt/
    /// 2. config.toml in that directory if it exists, else defaults
    /// 3. MKT_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: MKT_CONFIG_DIR env var > ./.mkt/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.realtime.validate()?;
        self.reconnect.validate()?;
        self.api.validate()?;

        if let Some(ref file) = self.logging.file
            && (Path::new(file).is_absolute() || file.contains(".."))
        {
            return Err(ConfigError::logging(
                "logging.file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Absolute path of the log file, if file logging is configured.
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match self.logging.file {
            Some(ref file) => {
                let dir = Self::config_dir()?.join(&self.logging.dir);
                Ok(Some(dir.join(file)))
            }
            None => Ok(None),
        }
    }

    /// Log configuration summary (NEVER logs credentials).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  realtime: {}{} (sockjs: {}, token query: {})",
            self.realtime.ws_base_url,
            self.realtime.path,
            self.realtime.sockjs,
            self.realtime.token_query_param
        );
        info!(
            "  handshake: timeout={}s, heartbeat={}ms/{}ms",
            self.realtime.connect_timeout_secs,
            self.realtime.heartbeat_outgoing_ms,
            self.realtime.heartbeat_incoming_ms
        );
        info!(
            "  reconnect: {} delay={}ms max_delay={}ms x{} attempts={}",
            self.reconnect.strategy,
            self.reconnect.delay_ms,
            self.reconnect.max_delay_ms,
            self.reconnect.multiplier,
            self.reconnect.max_attempts
        );
        info!(
            "  api: {} (timeout {}s)",
            self.api.base_url, self.api.timeout_secs
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Realtime
        Self::apply_env_string("MKT_WS_BASE_URL", &mut self.realtime.ws_base_url);
        Self::apply_env_string("MKT_WS_PATH", &mut self.realtime.path);
        Self::apply_env_bool("MKT_WS_SOCKJS", &mut self.realtime.sockjs);
        Self::apply_env_bool(
            "MKT_WS_TOKEN_QUERY_PARAM",
            &mut self.realtime.token_query_param,
        );
        Self::apply_env_parse(
            "MKT_WS_CONNECT_TIMEOUT_SECS",
            &mut self.realtime.connect_timeout_secs,
        );
        Self::apply_env_parse(
            "MKT_WS_HEARTBEAT_OUTGOING_MS",
            &mut self.realtime.heartbeat_outgoing_ms,
        );
        Self::apply_env_parse(
            "MKT_WS_HEARTBEAT_INCOMING_MS",
            &mut self.realtime.heartbeat_incoming_ms,
        );
        Self::apply_env_parse("MKT_WS_BUFFER_SIZE", &mut self.realtime.buffer_size);

        // Reconnect
        Self::apply_env_parse("MKT_RECONNECT_STRATEGY", &mut self.reconnect.strategy);
        Self::apply_env_parse("MKT_RECONNECT_DELAY_MS", &mut self.reconnect.delay_ms);
        Self::apply_env_parse(
            "MKT_RECONNECT_MAX_DELAY_MS",
            &mut self.reconnect.max_delay_ms,
        );
        Self::apply_env_parse("MKT_RECONNECT_MULTIPLIER", &mut self.reconnect.multiplier);
        Self::apply_env_parse(
            "MKT_RECONNECT_MAX_ATTEMPTS",
            &mut self.reconnect.max_attempts,
        );
        Self::apply_env_bool("MKT_RECONNECT_JITTER", &mut self.reconnect.jitter);

        // Api
        Self::apply_env_string("MKT_API_BASE_URL", &mut self.api.base_url);
        Self::apply_env_parse("MKT_API_TIMEOUT_SECS", &mut self.api.timeout_secs);

        // Logging
        Self::apply_env_parse("MKT_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("MKT_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("MKT_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
