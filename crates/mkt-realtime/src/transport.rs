use crate::{RealtimeError, Result as RealtimeErrorResult};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// Everything a transport needs to open one socket
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub url: Url,
    /// Extra upgrade request headers, e.g. `Authorization`
    pub headers: Vec<(String, String)>,
    pub buffer_size: usize,
    /// Wrap and unwrap SockJS framing
    pub sockjs: bool,
}

impl ConnectRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An open socket as a pair of channels carrying STOMP text.
///
/// `inbound` yields `None` once the socket is closed. Dropping every clone of
/// `outbound` closes the socket.
#[derive(Debug)]
pub struct TransportLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::Receiver<String>,
    /// Finishes once every queued payload is written and the socket closed.
    /// `None` when writes complete synchronously.
    pub writer: Option<JoinHandle<()>>,
}

impl TransportLink {
    #[track_caller]
    pub fn send(&self, payload: String) -> RealtimeErrorResult<()> {
        self.outbound
            .send(payload)
            .map_err(|_| RealtimeError::connection_closed("outbound channel closed"))
    }
}

/// Opens sockets for the connection manager
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: ConnectRequest) -> RealtimeErrorResult<TransportLink>;
}
