use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::models::{AlertEvent, InboundFrame, OutboundFrame};
use crate::services::bus::{EventBus, TransportEvent};

/// Base delay before the first reconnect attempt; doubles per attempt
pub const BASE_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Automatic reconnection stops after this many consecutive failures
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Lifecycle of the persistent alert connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    ReconnectScheduled,
    GivenUp,
}

/// Snapshot of the connection lifecycle for a status indicator
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    #[serde(rename = "reconnectAttempts")]
    pub reconnect_attempts: u32,
}

#[derive(Debug, Error)]
enum TransportError {
    #[error("WebSocket connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Delay before reconnect attempt `attempt` (1-based): base * 2^(attempt-1).
///
/// Deliberately jitter-free so the schedule stays predictable.
pub fn reconnect_delay(base_delay: Duration, attempt: u32) -> Duration {
    base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
}

struct Shared {
    url: String,
    user_id: String,
    base_delay: Duration,
    max_attempts: u32,
    bus: Arc<EventBus>,
    state: Mutex<ConnectionState>,
    attempts: AtomicU32,
    should_reconnect: AtomicBool,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().expect("transport lock poisoned") = state;
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock().expect("transport lock poisoned")
    }

    /// One dial + session. Err means the dial itself failed; Ok means a
    /// session ran and ended (server close, protocol error, or local
    /// teardown). The caller decides whether to reconnect.
    async fn connect_once(&self) -> Result<(), TransportError> {
        let url = format!("{}?userId={}", self.url, urlencoding::encode(&self.user_id));
        tracing::debug!("connecting to alert server: {}", self.url);

        let (ws_stream, _) = connect_async(url.as_str()).await?;

        self.attempts.store(0, Ordering::SeqCst);
        self.set_state(ConnectionState::Connected);
        tracing::info!("alert transport connected");
        self.bus.emit(&TransportEvent::Connected);

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        *self.outbound.lock().expect("transport lock poisoned") = Some(tx);

        loop {
            tokio::select! {
                frame = rx.recv() => match frame {
                    Some(message) => {
                        if let Err(e) = write.send(message).await {
                            tracing::warn!("failed to send frame: {}", e);
                            break;
                        }
                    }
                    // Sender dropped during teardown
                    None => break,
                },
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            tracing::warn!("failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("alert connection closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("alert connection error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }

        *self.outbound.lock().expect("transport lock poisoned") = None;
        self.bus.emit(&TransportEvent::Disconnected);
        Ok(())
    }

    /// Decode one inbound text frame and dispatch it.
    ///
    /// Frames that fail to decode (invalid JSON, unknown type, payload
    /// not matching its declared type) are dropped with a log line; the
    /// connection stays up.
    fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(InboundFrame::GigAlert(gig)) => {
                self.bus
                    .emit(&TransportEvent::Alert(AlertEvent::GigAlert(gig)));
            }
            Ok(InboundFrame::ApplicationUpdate(update)) => {
                self.bus
                    .emit(&TransportEvent::Alert(AlertEvent::ApplicationUpdate(update)));
            }
            Ok(InboundFrame::SystemNotification(notification)) => {
                self.bus.emit(&TransportEvent::Alert(
                    AlertEvent::SystemNotification(notification),
                ));
            }
            Ok(InboundFrame::Ping) => self.queue_frame(OutboundFrame::Pong),
            Err(e) => {
                tracing::debug!("dropping unrecognized frame: {}", e);
            }
        }
    }

    /// Queue a frame onto the open session without a state check;
    /// only called from within the session loop.
    fn queue_frame(&self, frame: OutboundFrame) {
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to encode outbound frame: {}", e);
                return;
            }
        };

        let outbound = self.outbound.lock().expect("transport lock poisoned");
        if let Some(tx) = outbound.as_ref() {
            if tx.send(Message::Text(json.into())).is_err() {
                tracing::warn!("alert session ended while queueing frame");
            }
        }
    }

    fn send_frame(&self, frame: OutboundFrame) {
        if self.state() != ConnectionState::Connected {
            tracing::warn!("alert transport not connected, dropping outbound frame");
            return;
        }
        self.queue_frame(frame);
    }
}

async fn run(shared: Arc<Shared>) {
    loop {
        shared.set_state(ConnectionState::Connecting);
        if let Err(e) = shared.connect_once().await {
            tracing::warn!("alert connection attempt failed: {}", e);
        }

        if !shared.should_reconnect.load(Ordering::SeqCst) {
            shared.set_state(ConnectionState::Disconnected);
            return;
        }

        let attempts = shared.attempts.load(Ordering::SeqCst);
        if attempts >= shared.max_attempts {
            tracing::warn!("giving up after {} reconnect attempts", attempts);
            shared.set_state(ConnectionState::GivenUp);
            return;
        }

        let attempt = attempts + 1;
        shared.attempts.store(attempt, Ordering::SeqCst);
        let delay = reconnect_delay(shared.base_delay, attempt);
        tracing::info!("reconnecting in {:?} (attempt {})", delay, attempt);
        shared.set_state(ConnectionState::ReconnectScheduled);
        tokio::time::sleep(delay).await;

        if !shared.should_reconnect.load(Ordering::SeqCst) {
            shared.set_state(ConnectionState::Disconnected);
            return;
        }
    }
}

/// Persistent-connection client for asynchronous alert events.
///
/// Owns the connection lifecycle: dialing, the reconnect/backoff state
/// machine, wire-frame decoding and keep-alive. Decoded events are
/// published on the injected [`EventBus`].
pub struct AlertTransport {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AlertTransport {
    pub fn new(url: String, user_id: String, bus: Arc<EventBus>) -> Self {
        Self::with_reconnect_policy(url, user_id, bus, BASE_RECONNECT_DELAY, MAX_RECONNECT_ATTEMPTS)
    }

    pub fn with_reconnect_policy(
        url: String,
        user_id: String,
        bus: Arc<EventBus>,
        base_delay: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                url,
                user_id,
                base_delay,
                max_attempts,
                bus,
                state: Mutex::new(ConnectionState::Disconnected),
                attempts: AtomicU32::new(0),
                should_reconnect: AtomicBool::new(true),
                outbound: Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the connection task. A manual call resets the attempt
    /// budget, so this also restarts a transport that has given up.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut task = self.task.lock().expect("transport lock poisoned");
        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                tracing::debug!("alert transport already running");
                return;
            }
        }

        self.shared.should_reconnect.store(true, Ordering::SeqCst);
        self.shared.attempts.store(0, Ordering::SeqCst);

        let shared = self.shared.clone();
        *task = Some(tokio::spawn(run(shared)));
    }

    /// Stop the transport. Disables reconnection, closes any open
    /// socket and cancels a pending reconnect timer, so a scheduled
    /// attempt can never resurrect the connection after a deliberate
    /// stop.
    pub fn disconnect(&self) {
        self.shared.should_reconnect.store(false, Ordering::SeqCst);
        let was_connected = self.shared.state() == ConnectionState::Connected;

        if let Some(handle) = self.task.lock().expect("transport lock poisoned").take() {
            handle.abort();
        }

        *self.shared.outbound.lock().expect("transport lock poisoned") = None;
        self.shared.set_state(ConnectionState::Disconnected);

        // The aborted session never reaches its own teardown, so the
        // close is reported here for an open connection
        if was_connected {
            self.shared.bus.emit(&TransportEvent::Disconnected);
        }
    }

    /// Send a control frame to the alert server.
    ///
    /// A no-op with a logged warning when the transport is not
    /// connected; call sites never have to handle transport state.
    pub fn send(&self, frame: OutboundFrame) {
        self.shared.send_frame(frame);
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state(),
            reconnect_attempts: self.shared.attempts.load(Ordering::SeqCst),
        }
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.shared.bus.clone()
    }
}

impl Drop for AlertTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().expect("transport lock poisoned").take() {
            handle.abort();
        }
    }
}
