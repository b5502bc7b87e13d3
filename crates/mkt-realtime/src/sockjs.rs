//! SockJS framing on the raw websocket leg.
//!
//! The server prefixes each text message with one character: `o` (open),
//! `h` (heartbeat), `a` (JSON array of messages) or `c` (close with
//! `[code, "reason"]`). Client messages are sent as a JSON array of strings.

use crate::{RealtimeError, Result as RealtimeErrorResult};

use uuid::Uuid;

pub const MAX_SERVER_ID: u32 = 999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SockJsFrame {
    Open,
    Heartbeat,
    Messages(Vec<String>),
    Close { code: u16, reason: String },
}

impl SockJsFrame {
    #[track_caller]
    pub fn decode(raw: &str) -> RealtimeErrorResult<Self> {
        let mut chars = raw.chars();
        let kind = chars
            .next()
            .ok_or_else(|| RealtimeError::invalid_frame("empty SockJS frame"))?;
        let rest = chars.as_str();

        match kind {
            'o' => Ok(Self::Open),
            'h' => Ok(Self::Heartbeat),
            'a' => {
                let messages: Vec<String> = serde_json::from_str(rest)?;
                Ok(Self::Messages(messages))
            }
            'c' => {
                let (code, reason): (u16, String) = serde_json::from_str(rest)?;
                Ok(Self::Close { code, reason })
            }
            other => Err(RealtimeError::invalid_frame(format!(
                "unknown SockJS frame type '{other}'"
            ))),
        }
    }
}

/// Wrap one outbound payload as a SockJS client message
pub fn encode_message(payload: &str) -> RealtimeErrorResult<String> {
    Ok(serde_json::to_string(&[payload])?)
}

/// `/<server>/<session>/websocket`, appended to the endpoint path
pub fn session_path() -> String {
    let server = rand::random_range(0..=MAX_SERVER_ID);
    let session = Uuid::new_v4().simple();
    format!("/{server:03}/{session}/websocket")
}
