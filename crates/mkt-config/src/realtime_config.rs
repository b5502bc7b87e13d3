use crate::{ConfigError, ConfigErrorResult, DEFAULT_SERVER_URL};

use serde::Deserialize;
use url::Url;

pub const DEFAULT_WS_PATH: &str = "/ws";

// Connect timeout constraints (seconds)
pub const MIN_CONNECT_TIMEOUT_SECS: u64 = 1;
pub const MAX_CONNECT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

// Heartbeat constraints (milliseconds, 0 disables)
pub const MIN_HEARTBEAT_MS: u64 = 1000;
pub const MAX_HEARTBEAT_MS: u64 = 120_000;
pub const DEFAULT_HEARTBEAT_MS: u64 = 10_000;

// Inbound buffer constraints
pub const MIN_BUFFER_SIZE: usize = 1;
pub const MAX_BUFFER_SIZE: usize = 10_000;
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Realtime channel (STOMP over WebSocket) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Base URL of the backend; http(s) is rewritten to ws(s)
    pub ws_base_url: String,
    /// Endpoint path appended to the base URL
    pub path: String,
    /// Use SockJS framing on the websocket leg
    pub sockjs: bool,
    /// Also pass the bearer token as `?token=` for transports without headers
    pub token_query_param: bool,
    /// Handshake must complete within this many seconds
    pub connect_timeout_secs: u64,
    /// Outgoing heartbeat the client offers (ms)
    pub heartbeat_outgoing_ms: u64,
    /// Incoming heartbeat the client asks for (ms)
    pub heartbeat_incoming_ms: u64,
    /// Inbound frame buffer between socket reader and session task
    pub buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_base_url: DEFAULT_SERVER_URL.to_string(),
            path: DEFAULT_WS_PATH.to_string(),
            sockjs: true,
            token_query_param: true,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            heartbeat_outgoing_ms: DEFAULT_HEARTBEAT_MS,
            heartbeat_incoming_ms: DEFAULT_HEARTBEAT_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl RealtimeConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let url = Url::parse(&self.ws_base_url).map_err(|e| {
            ConfigError::realtime(format!(
                "realtime.ws_base_url is not a valid URL ({}): {e}",
                self.ws_base_url
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(ConfigError::realtime(format!(
                "realtime.ws_base_url must use http, https, ws or wss, got {}",
                url.scheme()
            )));
        }

        if !self.path.starts_with('/') {
            return Err(ConfigError::realtime(format!(
                "realtime.path must start with '/', got {}",
                self.path
            )));
        }

        if self.connect_timeout_secs < MIN_CONNECT_TIMEOUT_SECS
            || self.connect_timeout_secs > MAX_CONNECT_TIMEOUT_SECS
        {
            return Err(ConfigError::realtime(format!(
                "realtime.connect_timeout_secs must be {}-{}, got {}",
                MIN_CONNECT_TIMEOUT_SECS, MAX_CONNECT_TIMEOUT_SECS, self.connect_timeout_secs
            )));
        }

        Self::validate_heartbeat("heartbeat_outgoing_ms", self.heartbeat_outgoing_ms)?;
        Self::validate_heartbeat("heartbeat_incoming_ms", self.heartbeat_incoming_ms)?;

        if self.buffer_size < MIN_BUFFER_SIZE || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::realtime(format!(
                "realtime.buffer_size must be {}-{}, got {}",
                MIN_BUFFER_SIZE, MAX_BUFFER_SIZE, self.buffer_size
            )));
        }

        Ok(())
    }

    fn validate_heartbeat(name: &str, value: u64) -> ConfigErrorResult<()> {
        if value != 0 && !(MIN_HEARTBEAT_MS..=MAX_HEARTBEAT_MS).contains(&value) {
            return Err(ConfigError::realtime(format!(
                "realtime.{name} must be 0 or {MIN_HEARTBEAT_MS}-{MAX_HEARTBEAT_MS}, got {value}"
            )));
        }
        Ok(())
    }
}
