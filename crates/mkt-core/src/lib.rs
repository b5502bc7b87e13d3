pub mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use error::{CoreError, Result};
pub use models::api_envelope::{ApiEnvelope, EnvelopeStatus};
pub use models::chat_message::ChatMessage;
pub use models::chat_message_draft::ChatMessageDraft;
pub use models::notification::Notification;
pub use models::ping_payload::PingPayload;
pub use models::read_receipt::ReadReceipt;
pub use models::timestamp::parse_timestamp;
