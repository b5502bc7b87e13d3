use serde::Serialize;

/// Body of `/app/notifications/read`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadReceipt {
    pub id: i64,
}
