use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Serialize;

/// Outgoing chat message published to `/app/chat.sendMessage`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDraft {
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
}

impl ChatMessageDraft {
    pub const DEFAULT_TYPE: &'static str = "TEXT";

    pub fn text(
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
            receiver_id: None,
            content: content.into(),
            message_type: Self::DEFAULT_TYPE.to_string(),
        }
    }

    pub fn with_receiver(mut self, receiver_id: impl Into<String>) -> Self {
        self.receiver_id = Some(receiver_id.into());
        self
    }

    #[track_caller]
    pub fn validate(&self) -> CoreErrorResult<()> {
        if self.conversation_id.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "conversation id must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.content.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "message content must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
