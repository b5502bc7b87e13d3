use crate::{Credential, RealtimeError, Result as RealtimeErrorResult, sockjs};

use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use mkt_config::RealtimeConfig;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080/ws";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(10);
pub const DEFAULT_BUFFER_SIZE: usize = 256;
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Runtime settings for one connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Full endpoint including path, `http(s)` or `ws(s)`
    pub endpoint: String,
    pub sockjs: bool,
    pub token_query_param: bool,
    pub connect_timeout: Duration,
    /// Zero disables the outgoing heartbeat
    pub heartbeat_outgoing: Duration,
    /// Zero disables the incoming heartbeat check
    pub heartbeat_incoming: Duration,
    pub buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sockjs: true,
            token_query_param: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            heartbeat_outgoing: DEFAULT_HEARTBEAT,
            heartbeat_incoming: DEFAULT_HEARTBEAT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl From<&RealtimeConfig> for ConnectionConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            endpoint: format!(
                "{}{}",
                config.ws_base_url.trim_end_matches('/'),
                config.path
            ),
            sockjs: config.sockjs,
            token_query_param: config.token_query_param,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            heartbeat_outgoing: Duration::from_millis(config.heartbeat_outgoing_ms),
            heartbeat_incoming: Duration::from_millis(config.heartbeat_incoming_ms),
            buffer_size: config.buffer_size,
        }
    }
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Websocket URL for one connection attempt.
    ///
    /// `http` maps to `ws` and `https` to `wss`. SockJS adds a fresh
    /// server/session segment per call. The token is appended as a query
    /// parameter when enabled.
    #[track_caller]
    pub fn websocket_url(&self, credential: &Credential) -> RealtimeErrorResult<Url> {
        let mut url = Url::parse(&ws_scheme(&self.endpoint))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(RealtimeError::InvalidUrl {
                message: format!("unsupported scheme '{}'", url.scheme()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.sockjs {
            let path = format!(
                "{}{}",
                url.path().trim_end_matches('/'),
                sockjs::session_path()
            );
            url.set_path(&path);
        }

        if self.token_query_param {
            url.query_pairs_mut()
                .append_pair(TOKEN_QUERY_PARAM, credential.expose());
        }

        Ok(url)
    }

    /// Value of the STOMP `host` header
    #[track_caller]
    pub fn host(&self) -> RealtimeErrorResult<String> {
        let url = Url::parse(&ws_scheme(&self.endpoint))?;
        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| RealtimeError::InvalidUrl {
                message: format!("endpoint '{}' has no host", self.endpoint),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

fn ws_scheme(endpoint: &str) -> String {
    if let Some(rest) = endpoint.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        endpoint.to_string()
    }
}
