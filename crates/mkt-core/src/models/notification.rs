use crate::models::serde_helpers::optional_timestamp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A push notification delivered on a per-user queue or seller topic.
///
/// Bodies may carry `read` and `isRead` side by side, and `createdAt` next
/// to `created_at`; the camelCase key wins when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NotificationBody")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    /// Deep link into the console that raised the notification
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Inbound shape with every accepted spelling as its own field
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationBody {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    notification_type: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    is_read: Option<bool>,
    #[serde(default)]
    read: Option<bool>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "created_at", deserialize_with = "optional_timestamp")]
    created_at_snake: Option<DateTime<Utc>>,
}

impl From<NotificationBody> for Notification {
    fn from(body: NotificationBody) -> Self {
        Self {
            id: body.id,
            title: body.title,
            message: body.message,
            notification_type: body.notification_type,
            link: body.link,
            is_read: body.is_read.or(body.read).unwrap_or(false),
            created_at: body.created_at.or(body.created_at_snake),
        }
    }
}

impl Notification {
    pub fn new(id: i64, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            message: message.into(),
            notification_type: None,
            link: None,
            is_read: false,
            created_at: Some(Utc::now()),
        }
    }

    /// Mark as read, returns true if the flag changed
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.is_read;
        self.is_read = true;
        changed
    }
}
