pub mod api_envelope;
pub mod chat_message;
pub mod chat_message_draft;
pub mod notification;
pub mod ping_payload;
pub mod read_receipt;
pub mod serde_helpers;
pub mod timestamp;
