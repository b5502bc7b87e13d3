mod api_envelope;
mod chat_message;
mod notification;
mod timestamp;
