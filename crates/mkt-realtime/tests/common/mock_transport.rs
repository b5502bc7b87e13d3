#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mkt_realtime::{
    ConnectRequest, ConnectionConfig, ConnectionManager, ConnectionState, Decoded, ReconnectPolicy,
    Result, StompCommand, StompFrame, Transport, TransportLink,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

pub const TEST_IDENTITY: &str = "user@example.com";
pub const TEST_TOKEN: &str = "abc123";
pub const STEP_TIMEOUT: Duration = Duration::from_secs(2);

const CONNECTED_FRAME: &str = "CONNECTED\nversion:1.2\nheart-beat:0,0\n\n\0";

/// In-memory transport handing each opened socket to the test as a
/// [`ServerSide`]
pub struct MockTransport {
    servers: mpsc::UnboundedSender<ServerSide>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, request: ConnectRequest) -> Result<TransportLink> {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::channel(request.buffer_size.max(1));

        let _ = self.servers.send(ServerSide {
            request,
            from_client: out_rx,
            to_client: Some(in_tx),
            buffered: VecDeque::new(),
            subscriptions: HashMap::new(),
        });

        Ok(TransportLink {
            outbound: out_tx,
            inbound: in_rx,
            writer: None,
        })
    }
}

pub fn mock_transport() -> (Arc<MockTransport>, mpsc::UnboundedReceiver<ServerSide>) {
    let (servers, rx) = mpsc::unbounded_channel();
    (Arc::new(MockTransport { servers }), rx)
}

/// Raw STOMP, no heartbeats, short handshake timeout
pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        sockjs: false,
        connect_timeout: Duration::from_secs(2),
        heartbeat_outgoing: Duration::ZERO,
        heartbeat_incoming: Duration::ZERO,
        ..ConnectionConfig::new("http://localhost:8080/ws")
    }
}

pub fn test_manager(
    transport: Arc<MockTransport>,
    policy: ReconnectPolicy,
) -> ConnectionManager {
    ConnectionManager::builder(test_config())
        .transport(transport)
        .policy(policy)
        .build()
}

pub fn fast_retry(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy::fixed(Duration::from_millis(20), max_attempts)
}

pub async fn next_server(servers: &mut mpsc::UnboundedReceiver<ServerSide>) -> ServerSide {
    timeout(STEP_TIMEOUT, servers.recv())
        .await
        .expect("client never opened a socket")
        .expect("transport dropped")
}

/// Poll `check` until it holds or the step timeout passes
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    let deadline = tokio::time::Instant::now() + STEP_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// The broker's end of one socket
pub struct ServerSide {
    pub request: ConnectRequest,
    from_client: mpsc::UnboundedReceiver<String>,
    to_client: Option<mpsc::Sender<String>>,
    buffered: VecDeque<StompFrame>,
    /// Live subscriptions as seen on the wire: id -> destination
    subscriptions: HashMap<String, String>,
}

impl ServerSide {
    fn track(&mut self, frame: &StompFrame) {
        match frame.command {
            StompCommand::Subscribe => {
                if let (Some(id), Some(destination)) =
                    (frame.get_header("id"), frame.get_header("destination"))
                {
                    self.subscriptions
                        .insert(id.to_string(), destination.to_string());
                }
            }
            StompCommand::Unsubscribe => {
                if let Some(id) = frame.get_header("id") {
                    self.subscriptions.remove(id);
                }
            }
            _ => {}
        }
    }

    fn buffer_payload(&mut self, payload: &str) {
        let decoded = StompFrame::decode_payload(payload).expect("client sent a bad frame");
        for item in decoded {
            if let Decoded::Frame(frame) = item {
                self.track(&frame);
                self.buffered.push_back(frame);
            }
        }
    }

    /// Raw payload as written by the client, heartbeats included
    pub async fn next_payload(&mut self) -> Option<String> {
        timeout(STEP_TIMEOUT, self.from_client.recv())
            .await
            .expect("client stayed silent")
    }

    pub async fn next_frame(&mut self) -> StompFrame {
        loop {
            if let Some(frame) = self.buffered.pop_front() {
                return frame;
            }
            let payload = self
                .next_payload()
                .await
                .expect("client closed the socket");
            self.buffer_payload(&payload);
        }
    }

    /// Frames already written by the client, without waiting
    pub fn drain(&mut self) -> Vec<StompFrame> {
        while let Ok(payload) = self.from_client.try_recv() {
            self.buffer_payload(&payload);
        }
        self.buffered.drain(..).collect()
    }

    /// Wait until the client drops its end of the socket
    pub async fn closed_by_client(&mut self) -> Vec<StompFrame> {
        let mut frames: Vec<StompFrame> = self.buffered.drain(..).collect();
        loop {
            match self.next_payload().await {
                Some(payload) => {
                    self.buffer_payload(&payload);
                    frames.extend(self.buffered.drain(..));
                }
                None => return frames,
            }
        }
    }

    pub async fn send_raw(&self, payload: &str) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(payload.to_string()).await;
        }
    }

    /// Read CONNECT and acknowledge it; returns the CONNECT frame
    pub async fn accept(&mut self) -> StompFrame {
        self.accept_with(CONNECTED_FRAME).await
    }

    pub async fn accept_with(&mut self, connected: &str) -> StompFrame {
        let connect = self.next_frame().await;
        assert_eq!(connect.command, StompCommand::Connect);
        self.send_raw(connected).await;
        connect
    }

    pub async fn reject(&mut self, message: &str) -> StompFrame {
        let connect = self.next_frame().await;
        let error = StompFrame::new(StompCommand::Error)
            .header("message", message)
            .encode();
        self.send_raw(&error).await;
        connect
    }

    pub async fn send_message(&self, subscription: &str, destination: &str, body: &str) {
        let frame = StompFrame::new(StompCommand::Message)
            .header("subscription", subscription)
            .header("destination", destination)
            .header("message-id", "m-1")
            .body(body);
        self.send_raw(&frame.encode()).await;
    }

    /// Simulate the broker dropping the socket
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn subscription_id_for(&self, destination: &str) -> Option<String> {
        self.subscriptions
            .iter()
            .find(|(_, dest)| dest.as_str() == destination)
            .map(|(id, _)| id.clone())
    }
}

/// Run `connect` for the test identity and accept the handshake
pub async fn connect_and_accept(
    manager: &ConnectionManager,
    servers: &mut mpsc::UnboundedReceiver<ServerSide>,
) -> ServerSide {
    let connecting = tokio::spawn({
        let manager = manager.clone();
        async move { manager.connect(TEST_IDENTITY, TEST_TOKEN).await }
    });

    let mut server = next_server(servers).await;
    server.accept().await;

    connecting
        .await
        .expect("connect task panicked")
        .expect("connect failed");
    server
}

pub async fn wait_for_state<F>(manager: &ConnectionManager, predicate: F) -> ConnectionState
where
    F: Fn(&ConnectionState) -> bool,
{
    let mut changes = manager.state_changes();
    let state = timeout(STEP_TIMEOUT, changes.wait_for(|state| predicate(state)))
        .await
        .expect("state never reached")
        .expect("manager dropped");
    state.clone()
}
