mod connection_config;
mod heartbeat;
mod session_store;
mod stomp_frame;
mod topic;

use crate::{Decoded, StompFrame};

use tokio::sync::mpsc;

/// Every frame queued on a link, decoded, in send order
pub(crate) fn drain_frames(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<StompFrame> {
    let mut frames = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        let decoded = StompFrame::decode_payload(&payload).expect("client sent a bad frame");
        frames.extend(decoded.into_iter().filter_map(|item| match item {
            Decoded::Frame(frame) => Some(frame),
            Decoded::Heartbeat => None,
        }));
    }
    frames
}
