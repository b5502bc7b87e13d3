use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("Connection closed: {reason} {location}")]
    ConnectionClosed {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Could not open realtime socket: {message} {location}")]
    ConnectFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("WebSocket error: {source} {location}")]
    WebSocket {
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
        location: ErrorLocation,
    },

    #[error("Handshake not acknowledged within {timeout_secs}s {location}")]
    HandshakeTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Handshake rejected: {message} {location}")]
    HandshakeRejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server error frame: {message} {location}")]
    ServerError {
        message: String,
        location: ErrorLocation,
    },

    #[error("Heartbeat timeout after {timeout_ms}ms {location}")]
    HeartbeatTimeout {
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Gave up reconnecting after {attempts} attempts {location}")]
    ReconnectExhausted {
        attempts: u32,
        location: ErrorLocation,
    },

    #[error("Realtime channel is not connected {location}")]
    NotConnected { location: ErrorLocation },

    #[error("Invalid frame: {message} {location}")]
    InvalidFrame {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid endpoint URL: {message} {location}")]
    InvalidUrl {
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON error: {source} {location}")]
    Json {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Validation failed: {source}")]
    Validation {
        #[source]
        source: mkt_core::CoreError,
        location: ErrorLocation,
    },
}

impl RealtimeError {
    #[track_caller]
    pub fn connection_closed<S: Into<String>>(reason: S) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_frame<S: Into<String>>(message: S) -> Self {
        Self::InvalidFrame {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_connected() -> Self {
        Self::NotConnected {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether another connection attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed { .. }
                | Self::ConnectFailed { .. }
                | Self::WebSocket { .. }
                | Self::HandshakeTimeout { .. }
                | Self::ServerError { .. }
                | Self::HeartbeatTimeout { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionClosed { .. } => "CONNECTION_CLOSED",
            Self::ConnectFailed { .. } => "CONNECT_FAILED",
            Self::WebSocket { .. } => "WEBSOCKET_ERROR",
            Self::HandshakeTimeout { .. } => "HANDSHAKE_TIMEOUT",
            Self::HandshakeRejected { .. } => "HANDSHAKE_REJECTED",
            Self::ServerError { .. } => "SERVER_ERROR",
            Self::HeartbeatTimeout { .. } => "HEARTBEAT_TIMEOUT",
            Self::ReconnectExhausted { .. } => "RECONNECT_EXHAUSTED",
            Self::NotConnected { .. } => "NOT_CONNECTED",
            Self::InvalidFrame { .. } => "INVALID_FRAME",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::Json { .. } => "JSON_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for RealtimeError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RealtimeError {
    #[track_caller]
    fn from(source: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<mkt_core::CoreError> for RealtimeError {
    #[track_caller]
    fn from(source: mkt_core::CoreError) -> Self {
        Self::Validation {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for RealtimeError {
    #[track_caller]
    fn from(source: url::ParseError) -> Self {
        Self::InvalidUrl {
            message: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RealtimeError>;
