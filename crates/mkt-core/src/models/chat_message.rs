use crate::models::serde_helpers::{optional_string_or_number, optional_timestamp};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message delivered on a conversation topic.
///
/// `conversation_id` may be missing from the body; the dispatcher fills it in
/// from the topic the frame arrived on. `type`/`messageType` and
/// `createdAt`/`created_at`/`timestamp` may appear together; the first
/// spelling present wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ChatMessageBody")]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub conversation_id: Option<String>,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Inbound shape with every accepted spelling as its own field
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageBody {
    #[serde(default)]
    id: Option<i64>,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    conversation_id: Option<String>,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    sender_id: Option<String>,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    receiver_id: Option<String>,

    #[serde(default)]
    content: String,

    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    message_type: Option<String>,

    #[serde(default, deserialize_with = "optional_timestamp")]
    created_at: Option<DateTime<Utc>>,

    #[serde(default, rename = "created_at", deserialize_with = "optional_timestamp")]
    created_at_snake: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "optional_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

impl From<ChatMessageBody> for ChatMessage {
    fn from(body: ChatMessageBody) -> Self {
        Self {
            id: body.id,
            conversation_id: body.conversation_id,
            sender_id: body.sender_id,
            receiver_id: body.receiver_id,
            content: body.content,
            message_type: body.kind.or(body.message_type),
            created_at: body
                .created_at
                .or(body.created_at_snake)
                .or(body.timestamp),
        }
    }
}
