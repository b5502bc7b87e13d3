//! One-line terminal rendering of realtime traffic.

use mkt_core::{ChatMessage, Notification};
use mkt_realtime::InboundMessage;

const UNKNOWN: &str = "?";

pub fn render_notification(notification: &Notification) -> String {
    let marker = if notification.is_read { " " } else { "*" };
    let kind = notification
        .notification_type
        .as_deref()
        .map(|kind| format!(" {kind}"))
        .unwrap_or_default();

    format!(
        "{marker}[notification #{id}{kind}] {title}: {message}",
        id = notification.id,
        title = notification.title,
        message = notification.message,
    )
}

pub fn render_chat(message: &ChatMessage) -> String {
    let time = message
        .created_at
        .map(|at| format!("{} ", at.format("%H:%M:%S")))
        .unwrap_or_default();

    format!(
        "{time}[chat {conversation}] {sender}: {content}",
        conversation = message.conversation_id.as_deref().unwrap_or(UNKNOWN),
        sender = message.sender_id.as_deref().unwrap_or(UNKNOWN),
        content = message.content,
    )
}

pub fn render_message(message: &InboundMessage) -> String {
    match message {
        InboundMessage::Chat(chat) => render_chat(chat),
        InboundMessage::Notification(notification) => render_notification(notification),
        InboundMessage::Ping(ping) => format!(
            "[{kind} on {topic}] from {user}",
            kind = ping.kind.to_ascii_lowercase(),
            topic = ping.topic,
            user = ping.user_id.as_deref().unwrap_or(UNKNOWN),
        ),
    }
}
