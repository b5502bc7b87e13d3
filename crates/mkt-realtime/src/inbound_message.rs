use chrono::{DateTime, Utc};
use mkt_core::{ChatMessage, Notification};

/// Liveness ping or its echo, seen on any topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPing {
    /// Destination the ping arrived on
    pub topic: String,
    /// `PING` or `PONG` as sent
    pub kind: String,
    pub user_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A classified inbound frame body
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Chat(ChatMessage),
    Notification(Notification),
    Ping(ControlPing),
}

impl InboundMessage {
    pub fn as_chat(&self) -> Option<&ChatMessage> {
        match self {
            Self::Chat(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Self::Notification(notification) => Some(notification),
            _ => None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Chat(message) => message.created_at,
            Self::Notification(notification) => notification.created_at,
            Self::Ping(ping) => ping.timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Notification(_) => "notification",
            Self::Ping(_) => "ping",
        }
    }
}
