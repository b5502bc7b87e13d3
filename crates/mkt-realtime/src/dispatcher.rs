use crate::{
    ControlPing, InboundMessage, NotificationStore, Result as RealtimeErrorResult, StompCommand,
    StompFrame, SubscriptionRegistry, Topic,
};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use mkt_core::models::serde_helpers::{optional_string_or_number, optional_timestamp};
use mkt_core::{ChatMessage, Notification};
use serde::Deserialize;
use serde_json::Value;

const PING: &str = "PING";
const PONG: &str = "PONG";

/// User-facing popup for freshly arrived notifications
pub trait ToastSink: Send + Sync {
    fn show(&self, notification: &Notification);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PingBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

/// Turns MESSAGE frames into [`InboundMessage`]s and routes them.
///
/// Notification topics feed the shared store and the toast sink before
/// reaching topic listeners. Conversation topics reach only the listeners of
/// that conversation. Bodies that fail to parse are logged and dropped.
#[derive(Clone)]
pub struct Dispatcher {
    registry: SubscriptionRegistry,
    store: NotificationStore,
    toast: Option<Arc<dyn ToastSink>>,
}

impl Dispatcher {
    pub fn new(registry: SubscriptionRegistry, store: NotificationStore) -> Self {
        Self {
            registry,
            store,
            toast: None,
        }
    }

    pub fn with_toast(mut self, toast: Arc<dyn ToastSink>) -> Self {
        self.toast = Some(toast);
        self
    }

    /// Route one frame. Returns what was delivered, `None` if the frame was
    /// not a MESSAGE or was dropped.
    pub fn dispatch(&self, frame: &StompFrame) -> Option<InboundMessage> {
        if frame.command != StompCommand::Message {
            debug!("Dispatcher ignoring {} frame", frame.command);
            return None;
        }

        let destination = frame.get_header("destination");
        let Some(topic) = self
            .registry
            .resolve(frame.get_header("subscription"), destination)
        else {
            warn!("Dropping MESSAGE without subscription or destination");
            return None;
        };

        let message = match Self::classify(&topic, &frame.body) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping unparseable message on {topic}: {e}");
                return None;
            }
        };

        match &message {
            InboundMessage::Notification(notification) if topic.is_notification() => {
                self.store.add(notification.clone());
                if let Some(toast) = &self.toast {
                    toast.show(notification);
                }
            }
            InboundMessage::Ping(ping) => {
                debug!("{} on {} from {:?}", ping.kind, ping.topic, ping.user_id);
            }
            _ => {}
        }

        let delivered = self.registry.notify(&topic, &message);
        debug!("Delivered {} message on {topic} to {delivered} listener(s)", message.kind());

        Some(message)
    }

    /// Parse `body` according to the topic it arrived on
    pub fn classify(topic: &Topic, body: &str) -> RealtimeErrorResult<InboundMessage> {
        let value: Value = serde_json::from_str(body)?;

        if Self::is_control_ping(&value) {
            let ping: PingBody = serde_json::from_value(value)?;
            return Ok(InboundMessage::Ping(ControlPing {
                topic: topic.destination(),
                kind: ping.kind.to_uppercase(),
                user_id: ping.user_id,
                timestamp: ping.timestamp,
            }));
        }

        match topic {
            Topic::UserNotifications { .. } | Topic::SellerNotifications { .. } => Ok(
                InboundMessage::Notification(serde_json::from_value(value)?),
            ),
            Topic::Conversation { conversation_id } => {
                let mut message: ChatMessage = serde_json::from_value(value)?;
                if message.conversation_id.is_none() {
                    message.conversation_id = Some(conversation_id.clone());
                }
                Ok(InboundMessage::Chat(message))
            }
            Topic::Custom(_) => match serde_json::from_value::<Notification>(value.clone()) {
                Ok(notification) => Ok(InboundMessage::Notification(notification)),
                Err(_) => Ok(InboundMessage::Chat(serde_json::from_value(value)?)),
            },
        }
    }

    fn is_control_ping(value: &Value) -> bool {
        value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| kind.eq_ignore_ascii_case(PING) || kind.eq_ignore_ascii_case(PONG))
    }
}
