use crate::{
    ConnectRequest, ConnectionConfig, ConnectionState, Credential, Decoded, Dispatcher,
    FrameBuffer, Heartbeat, Listener, ListenerId, NotificationStore, RealtimeError, ReconnectPolicy,
    Result as RealtimeErrorResult, SessionStore, StompCommand, StompFrame, SubscriptionRegistry,
    ToastSink, Topic, Transport, TransportLink, WebSocketTransport, HEARTBEAT_EOL,
};

use std::panic::Location;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, error, info, warn};
use mkt_core::{ChatMessageDraft, PingPayload, ReadReceipt};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, interval_at, sleep, timeout};

pub const READ_RECEIPT_DESTINATION: &str = "/app/notifications/read";
pub const PING_DESTINATION: &str = "/app/notifications/ping";
pub const CHAT_DESTINATION: &str = "/app/chat.sendMessage";
const AUTHORIZATION_HEADER: &str = "Authorization";

/// Owns the single realtime connection for the current identity.
///
/// Clones share the same connection. `connect` starts a background session
/// task that performs the STOMP handshake, pumps frames into the dispatcher
/// and reconnects according to the [`ReconnectPolicy`].
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: ConnectionConfig,
    policy: ReconnectPolicy,
    transport: Arc<dyn Transport>,
    registry: SubscriptionRegistry,
    notifications: NotificationStore,
    dispatcher: Dispatcher,
    state_tx: watch::Sender<ConnectionState>,
    attempts: AtomicU32,
    session: tokio::sync::Mutex<Option<ActiveSession>>,
    /// Outbound side of the live link; `None` unless connected
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// Socket writer of the live link
    writer: Mutex<Option<JoinHandle<()>>>,
    /// Read receipts marked locally while disconnected
    pending_receipts: Mutex<Vec<i64>>,
    receipt_counter: AtomicU64,
    /// Identity the pending receipts and stored notifications belong to
    owner: Mutex<Option<String>>,
}

struct ActiveSession {
    identity: String,
    credential: Credential,
    task: JoinHandle<()>,
}

/// A socket that completed the STOMP handshake
struct Established {
    link: TransportLink,
    heartbeat: Heartbeat,
    /// Frames that arrived in the same payload as CONNECTED
    backlog: Vec<StompFrame>,
    /// Partial frame left over after CONNECTED
    frames: FrameBuffer,
}

pub struct ConnectionManagerBuilder {
    config: ConnectionConfig,
    policy: ReconnectPolicy,
    transport: Option<Arc<dyn Transport>>,
    registry: SubscriptionRegistry,
    notifications: NotificationStore,
    toast: Option<Arc<dyn ToastSink>>,
}

impl ConnectionManagerBuilder {
    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn registry(mut self, registry: SubscriptionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn notifications(mut self, notifications: NotificationStore) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn toast(mut self, toast: Arc<dyn ToastSink>) -> Self {
        self.toast = Some(toast);
        self
    }

    pub fn build(self) -> ConnectionManager {
        let mut dispatcher = Dispatcher::new(self.registry.clone(), self.notifications.clone());
        if let Some(toast) = self.toast {
            dispatcher = dispatcher.with_toast(toast);
        }

        let (state_tx, _rx) = watch::channel(ConnectionState::Disconnected);

        ConnectionManager {
            inner: Arc::new(ManagerInner {
                config: self.config,
                policy: self.policy,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(WebSocketTransport::new())),
                registry: self.registry,
                notifications: self.notifications,
                dispatcher,
                state_tx,
                attempts: AtomicU32::new(0),
                session: tokio::sync::Mutex::new(None),
                outbound: Mutex::new(None),
                writer: Mutex::new(None),
                pending_receipts: Mutex::new(Vec::new()),
                receipt_counter: AtomicU64::new(0),
                owner: Mutex::new(None),
            }),
        }
    }
}

impl ConnectionManager {
    pub fn builder(config: ConnectionConfig) -> ConnectionManagerBuilder {
        ConnectionManagerBuilder {
            config,
            policy: ReconnectPolicy::default(),
            transport: None,
            registry: SubscriptionRegistry::new(),
            notifications: NotificationStore::new(),
            toast: None,
        }
    }

    pub fn new(config: ConnectionConfig, policy: ReconnectPolicy) -> Self {
        Self::builder(config).policy(policy).build()
    }

    /// Open the realtime connection for `identity`.
    ///
    /// Resolves once the first attempt reaches `Connected` or fails. A
    /// retryable failure keeps reconnecting in the background. Calling again
    /// with the same live identity and credential is a no-op; a different
    /// identity tears the old connection down first.
    pub async fn connect(
        &self,
        identity: impl Into<String>,
        credential: impl Into<Credential>,
    ) -> RealtimeErrorResult<()> {
        let identity = identity.into();
        let credential = credential.into();

        let mut session = self.inner.session.lock().await;

        if let Some(active) = session.as_ref()
            && active.identity == identity
            && active.credential == credential
            && !active.task.is_finished()
        {
            debug!("Realtime session for {identity} already running");
            return Ok(());
        }

        if let Some(previous) = session.take() {
            info!(
                "Replacing realtime session for {} with {identity}",
                previous.identity
            );
            self.inner.teardown(previous).await;
        }
        self.inner.claim_owner(&identity);

        self.inner.attempts.store(0, Ordering::SeqCst);
        let (ready_tx, ready_rx) = oneshot::channel();
        let task = tokio::spawn(run_session(
            Arc::clone(&self.inner),
            credential.clone(),
            ready_tx,
        ));

        *session = Some(ActiveSession {
            identity,
            credential,
            task,
        });
        drop(session);

        match ready_rx.await {
            Ok(result) => result,
            Err(_) => Err(RealtimeError::connection_closed(
                "session ended before the handshake completed",
            )),
        }
    }

    /// Close the connection. Returns once queued frames, DISCONNECT included,
    /// are written. Safe to call any number of times.
    pub async fn disconnect(&self) {
        let previous = self.inner.session.lock().await.take();
        match previous {
            Some(active) => {
                info!("Disconnecting realtime session for {}", active.identity);
                self.inner.teardown(active).await;
            }
            None => debug!("Disconnect requested while already disconnected"),
        }
    }

    /// Disconnect and forget everything tied to the signed-in user: queued
    /// read receipts and stored notifications.
    pub async fn sign_out(&self) {
        self.disconnect().await;
        self.inner.clear_user_state();
        *self.inner.owner() = None;
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state_tx.borrow().is_connected()
    }

    /// Reconnect attempts since the last successful handshake
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    pub async fn wait_until_connected(&self, limit: Duration) -> RealtimeErrorResult<()> {
        let mut changes = self.state_changes();
        match timeout(limit, changes.wait_for(ConnectionState::is_connected)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(RealtimeError::connection_closed("connection manager dropped")),
            Err(_) => Err(RealtimeError::HandshakeTimeout {
                timeout_secs: limit.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.inner.registry
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.inner.notifications
    }

    pub fn subscribe(&self, topic: Topic, listener: Listener) -> ListenerId {
        self.inner.registry.subscribe(topic, listener)
    }

    pub fn unsubscribe(&self, topic: &Topic, id: ListenerId) -> bool {
        self.inner.registry.unsubscribe(topic, id)
    }

    /// Serialize `body` as JSON and SEND it to `destination`
    pub fn publish<T: Serialize + ?Sized>(
        &self,
        destination: &str,
        body: &T,
    ) -> RealtimeErrorResult<()> {
        let json = serde_json::to_string(body)?;
        self.inner
            .send_frame(StompFrame::send_json(destination, json, None))
    }

    /// Mark a notification read locally, then tell the server.
    ///
    /// The local flag flips first and is never rolled back. While
    /// disconnected the receipt is queued and sent after the next handshake.
    /// Returns whether the local flag changed.
    pub fn mark_notification_read(&self, id: i64) -> RealtimeErrorResult<bool> {
        let changed = self.inner.notifications.mark_read(id);

        let outbound = self.inner.outbound();
        match outbound.as_ref() {
            Some(tx) => {
                let frame = self.inner.read_receipt_frame(id)?;
                if tx.send(frame.encode()).is_err() {
                    self.inner.queue_receipt(id);
                }
            }
            None => self.inner.queue_receipt(id),
        }

        Ok(changed)
    }

    pub fn pending_receipts(&self) -> Vec<i64> {
        self.inner.pending().clone()
    }

    pub fn ping(&self, user_id: impl Into<String>) -> RealtimeErrorResult<()> {
        self.publish(PING_DESTINATION, &PingPayload::now(user_id))
    }

    pub fn send_chat_message(&self, draft: &ChatMessageDraft) -> RealtimeErrorResult<()> {
        draft.validate()?;
        self.publish(CHAT_DESTINATION, draft)
    }

    /// Connect on login and disconnect on logout for as long as `store`
    /// lives. The current session is applied immediately.
    pub fn follow_session(&self, store: &SessionStore) -> JoinHandle<()> {
        let manager = self.clone();
        let mut changes = store.changes();

        tokio::spawn(async move {
            loop {
                let session = changes.borrow_and_update().clone();
                match session {
                    Some(session) => {
                        if let Err(e) = manager.connect(session.identity, session.credential).await
                        {
                            warn!("Realtime connect failed: {e}");
                        }
                    }
                    None => manager.sign_out().await,
                }

                if changes.changed().await.is_err() {
                    debug!("Session store dropped, no longer following");
                    break;
                }
            }
        })
    }
}

impl ManagerInner {
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            true
        });
        if changed {
            info!("Realtime connection {next}");
        }
    }

    fn outbound(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<String>>> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writer_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Vec<i64>> {
        self.pending_receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn owner(&self) -> MutexGuard<'_, Option<String>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `identity` as the owner of local state, dropping state left
    /// behind by a different identity.
    fn claim_owner(&self, identity: &str) {
        let mut owner = self.owner();
        if let Some(previous) = owner.as_deref()
            && previous != identity
        {
            info!("Identity changed from {previous} to {identity}, clearing local state");
            self.clear_user_state();
        }
        *owner = Some(identity.to_string());
    }

    fn clear_user_state(&self) {
        self.pending().clear();
        self.notifications.clear();
    }

    fn queue_receipt(&self, id: i64) {
        debug!("Queueing read receipt for notification {id} until connected");
        self.pending().push(id);
    }

    fn read_receipt_frame(&self, id: i64) -> RealtimeErrorResult<StompFrame> {
        let receipt = format!(
            "read-{id}-{}",
            self.receipt_counter.fetch_add(1, Ordering::SeqCst) + 1
        );
        let json = serde_json::to_string(&ReadReceipt { id })?;
        Ok(StompFrame::send_json(
            READ_RECEIPT_DESTINATION,
            json,
            Some(receipt.as_str()),
        ))
    }

    #[track_caller]
    fn send_frame(&self, frame: StompFrame) -> RealtimeErrorResult<()> {
        let outbound = self.outbound();
        let tx = outbound.as_ref().ok_or_else(RealtimeError::not_connected)?;
        tx.send(frame.encode())
            .map_err(|_| RealtimeError::not_connected())
    }

    /// Send DISCONNECT, stop the session task and wait for the socket writer
    /// to flush. Once every outbound sender is gone the writer drains its
    /// queue and closes the socket.
    async fn teardown(&self, active: ActiveSession) {
        if let Some(tx) = self.outbound().take() {
            let _ = tx.send(StompFrame::disconnect().encode());
        }

        active.task.abort();
        let _ = active.task.await;

        self.registry.detach();

        let writer = self.writer_slot().take();
        if let Some(writer) = writer
            && timeout(self.config.connect_timeout, writer).await.is_err()
        {
            warn!("Socket writer did not finish within the connect timeout");
        }

        self.set_state(ConnectionState::Disconnected);
    }

    /// Open a socket and complete the STOMP handshake within the connect
    /// timeout. Dropping the link on timeout closes the socket.
    async fn establish(&self, credential: &Credential) -> RealtimeErrorResult<Established> {
        let request = ConnectRequest {
            url: self.config.websocket_url(credential)?,
            headers: vec![(AUTHORIZATION_HEADER.to_string(), credential.bearer())],
            buffer_size: self.config.buffer_size,
            sockjs: self.config.sockjs,
        };
        let host = self.config.host()?;

        match timeout(
            self.config.connect_timeout,
            self.handshake(request, credential, &host),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RealtimeError::HandshakeTimeout {
                timeout_secs: self.config.connect_timeout.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn handshake(
        &self,
        request: ConnectRequest,
        credential: &Credential,
        host: &str,
    ) -> RealtimeErrorResult<Established> {
        let mut link = self.transport.open(request).await?;

        let heart_beat = Heartbeat::header(
            self.config.heartbeat_outgoing,
            self.config.heartbeat_incoming,
        );
        link.send(StompFrame::connect(host, credential, &heart_beat).encode())?;

        let mut frames = FrameBuffer::new();
        loop {
            let Some(payload) = link.inbound.recv().await else {
                return Err(RealtimeError::connection_closed(
                    "socket closed during handshake",
                ));
            };

            let mut items = frames.push(&payload)?.into_iter();
            while let Some(item) = items.next() {
                let Decoded::Frame(frame) = item else {
                    continue;
                };

                match frame.command {
                    StompCommand::Connected => {
                        let heartbeat = Heartbeat::negotiate(
                            self.config.heartbeat_outgoing,
                            self.config.heartbeat_incoming,
                            frame.get_header("heart-beat"),
                        );
                        debug!(
                            "STOMP {} session established, heartbeat {:?}",
                            frame.get_header("version").unwrap_or("1.0"),
                            heartbeat
                        );
                        let backlog = items
                            .filter_map(|item| match item {
                                Decoded::Frame(frame) => Some(frame),
                                Decoded::Heartbeat => None,
                            })
                            .collect();
                        return Ok(Established {
                            link,
                            heartbeat,
                            backlog,
                            frames,
                        });
                    }
                    StompCommand::Error => {
                        return Err(RealtimeError::HandshakeRejected {
                            message: error_message(&frame),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                    other => debug!("Ignoring {other} frame before CONNECTED"),
                }
            }
        }
    }

    /// Publish the link to the registry and senders, then report Connected
    fn on_connected(
        &self,
        outbound: &mpsc::UnboundedSender<String>,
        writer: Option<JoinHandle<()>>,
    ) {
        *self.writer_slot() = writer;

        let mut slot = self.outbound();
        *slot = Some(outbound.clone());

        self.registry.attach(outbound.clone());

        let pending: Vec<i64> = self.pending().drain(..).collect();
        for id in pending {
            match self.read_receipt_frame(id) {
                Ok(frame) => {
                    if outbound.send(frame.encode()).is_err() {
                        self.pending().push(id);
                    }
                }
                Err(e) => warn!("Dropping read receipt for {id}: {e}"),
            }
        }
        drop(slot);

        self.set_state(ConnectionState::Connected);
    }

    fn on_disconnected(&self) {
        self.outbound().take();
        self.writer_slot().take();
        self.registry.detach();
    }

    /// Pump frames until the connection ends; returns why it ended
    async fn run_connected(
        &self,
        established: Established,
        ready: &mut Option<oneshot::Sender<RealtimeErrorResult<()>>>,
    ) -> RealtimeError {
        let Established {
            link,
            heartbeat,
            backlog,
            mut frames,
        } = established;
        let TransportLink {
            outbound,
            mut inbound,
            writer,
        } = link;

        self.on_connected(&outbound, writer);
        if let Some(tx) = ready.take() {
            let _ = tx.send(Ok(()));
        }

        for frame in backlog {
            if let Err(e) = self.handle_frame(frame) {
                return e;
            }
        }

        let mut ticker = heartbeat_ticker(&heartbeat);
        let receive_timeout = heartbeat.receive_timeout();
        let mut last_seen = Instant::now();

        loop {
            tokio::select! {
                payload = inbound.recv() => {
                    let Some(payload) = payload else {
                        return RealtimeError::connection_closed("socket closed by peer");
                    };
                    last_seen = Instant::now();

                    let items = match frames.push(&payload) {
                        Ok(items) => items,
                        Err(e) => {
                            warn!("Dropping undecodable frame data: {e}");
                            continue;
                        }
                    };

                    for item in items {
                        if let Decoded::Frame(frame) = item
                            && let Err(e) = self.handle_frame(frame)
                        {
                            return e;
                        }
                    }
                }
                _ = tick(&mut ticker) => {
                    if !heartbeat.outgoing.is_zero()
                        && outbound.send(HEARTBEAT_EOL.to_string()).is_err()
                    {
                        return RealtimeError::connection_closed("outbound channel closed");
                    }

                    if let Some(limit) = receive_timeout
                        && last_seen.elapsed() > limit
                    {
                        return RealtimeError::HeartbeatTimeout {
                            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                            location: ErrorLocation::from(Location::caller()),
                        };
                    }
                }
            }
        }
    }

    fn handle_frame(&self, frame: StompFrame) -> RealtimeErrorResult<()> {
        match frame.command {
            StompCommand::Message => {
                self.dispatcher.dispatch(&frame);
                Ok(())
            }
            StompCommand::Receipt => {
                debug!(
                    "Server acknowledged receipt {}",
                    frame.get_header("receipt-id").unwrap_or("?")
                );
                Ok(())
            }
            StompCommand::Error => Err(RealtimeError::ServerError {
                message: error_message(&frame),
                location: ErrorLocation::from(Location::caller()),
            }),
            other => {
                debug!("Ignoring unexpected {other} frame");
                Ok(())
            }
        }
    }
}

/// Background task behind one `connect` call
async fn run_session(
    inner: Arc<ManagerInner>,
    credential: Credential,
    ready_tx: oneshot::Sender<RealtimeErrorResult<()>>,
) {
    let mut ready = Some(ready_tx);

    loop {
        inner.set_state(ConnectionState::Connecting);

        let failure = match inner.establish(&credential).await {
            Ok(established) => {
                let previous = inner.attempts.swap(0, Ordering::SeqCst);
                if previous > 0 {
                    info!("Realtime reconnected after {previous} attempt(s)");
                }
                let reason = inner.run_connected(established, &mut ready).await;
                inner.on_disconnected();
                reason
            }
            Err(e) => e,
        };

        let retryable = failure.is_retryable();
        let message = failure.to_string();
        warn!("Realtime connection lost: {message}");

        if let Some(tx) = ready.take() {
            let _ = tx.send(Err(failure));
        }

        if !retryable {
            error!("Realtime connection will not be retried");
            inner.set_state(ConnectionState::Error { message });
            return;
        }

        let attempt = inner.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(delay) = inner.policy.delay_for(attempt) else {
            if inner.policy == ReconnectPolicy::Never {
                inner.set_state(ConnectionState::Disconnected);
            } else {
                let exhausted = RealtimeError::ReconnectExhausted {
                    attempts: attempt - 1,
                    location: ErrorLocation::from(Location::caller()),
                };
                error!("{exhausted}");
                inner.set_state(ConnectionState::Error {
                    message: exhausted.to_string(),
                });
            }
            return;
        };

        inner.set_state(ConnectionState::Disconnected);
        info!(
            "Reconnecting in {:?} (attempt {attempt}/{})",
            delay,
            inner.policy.max_attempts()
        );
        sleep(delay).await;
    }
}

fn heartbeat_ticker(heartbeat: &Heartbeat) -> Option<Interval> {
    let period = [heartbeat.outgoing, heartbeat.incoming]
        .into_iter()
        .filter(|d| !d.is_zero())
        .min()?;
    Some(interval_at(Instant::now() + period, period))
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn error_message(frame: &StompFrame) -> String {
    frame
        .get_header("message")
        .map(str::to_string)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| frame.body.trim().to_string())
}
