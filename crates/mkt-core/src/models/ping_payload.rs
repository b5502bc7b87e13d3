use chrono::Utc;
use serde::Serialize;

/// Liveness ping body published to `/app/notifications/ping`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingPayload {
    pub user_id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl PingPayload {
    pub fn now(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
