//! WebSocket transport: one persistent relay connection per surface.
//!
//! [`Connection::open`] spawns a single socket task that owns the WebSocket
//! and returns immediately with:
//!
//! 1. a cheap, cloneable [`Connection`] handle for sending and closing, and
//! 2. a receiver of [`ChannelEvent`]s (state changes and inbound frames, in
//!    arrival order) for a [`crate::application::ChannelDispatcher`].
//!
//! ```text
//! Connection::send ──► unbounded FIFO ──► socket task ──► WebSocket sink
//!                                            │
//! ChannelEvent rx  ◄── bounded channel ◄─────┴─◄── WebSocket stream
//! ```
//!
//! # Send policy
//!
//! `send` never waits.  While the connection is not Open it queues nothing
//! and returns [`SendOutcome::NotOpen`].  Frames go through one FIFO, so the
//! relay receives them in send order.
//!
//! # Closing
//!
//! The lifecycle always ends in exactly one closed state:
//!
//! - the peer's Close frame was received → `ClosedClean`;
//! - connect failure, `close()` before the handshake completed, I/O error,
//!   EOF without a Close frame, or no reply to our own Close within
//!   [`CLOSE_TIMEOUT`] → `ClosedUnclean`.
//!
//! There is no reconnection.  A surface that wants one opens a new
//! `Connection`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use relay_core::{encode_frame, ConnectionLifecycle, ConnectionState, OutboundMessage};

use crate::application::outbound::{ChannelEvent, Outbound, SendOutcome};

/// How long `close()` waits for the peer's Close frame.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Capacity of the inbound event channel.  The socket task waits when the
/// consumer falls this far behind.
const EVENT_BUFFER: usize = 256;

/// Failure of the relay connection.
///
/// Never returned to callers: the socket task turns it into an unclean
/// close whose reason is this error's text.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: WsError,
    },

    #[error("transport error on {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: WsError,
    },

    #[error("{0} ended without a close handshake")]
    Dropped(String),

    #[error("{0} was closed before the handshake completed")]
    ClosedBeforeOpen(String),

    #[error("peer did not answer the close handshake within {0:?}")]
    CloseTimeout(Duration),
}

enum Command {
    Frame(String),
    Close,
}

/// Handle to one relay connection.
#[derive(Clone)]
pub struct Connection {
    id: Uuid,
    endpoint: Arc<str>,
    state: watch::Receiver<ConnectionState>,
    commands: mpsc::UnboundedSender<Command>,
}

impl Connection {
    /// Starts connecting to `endpoint` (a `ws://` or `wss://` URL).
    ///
    /// Must be called from within a Tokio runtime.  The returned receiver
    /// should be drained continuously, e.g. by a `ChannelDispatcher`.
    pub fn open(endpoint: impl Into<String>) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let endpoint: Arc<str> = endpoint.into().into();
        let id = Uuid::new_v4();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        info!(connection = %id, %endpoint, "opening relay connection");

        let task = SocketTask {
            id,
            endpoint: Arc::clone(&endpoint),
            lifecycle: ConnectionLifecycle::new(),
            state_tx,
            events: event_tx,
        };
        tokio::spawn(task.run(cmd_rx));

        let connection = Self {
            id,
            endpoint,
            state: state_rx,
            commands: cmd_tx,
        };
        (connection, event_rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Starts the close handshake.  Frames queued before this call are sent
    /// first; `send` calls racing with it may be discarded.
    ///
    /// While still Connecting, the handshake is abandoned and the connection
    /// ends ClosedUnclean.
    pub fn close(&self) {
        debug!(connection = %self.id, "close requested");
        // Fails only if the socket task already ended, i.e. we are closed.
        let _ = self.commands.send(Command::Close);
    }

    /// Waits until the state satisfies `predicate` and returns that state.
    /// If the socket task ends first, returns the final state.
    pub async fn wait_until(&self, predicate: impl FnMut(&ConnectionState) -> bool) -> ConnectionState {
        let mut rx = self.state.clone();
        let reached = rx.wait_for(predicate).await.map(|state| *state);
        reached.unwrap_or_else(|_| *rx.borrow())
    }

    /// Waits for the terminal state.
    pub async fn closed(&self) -> ConnectionState {
        self.wait_until(|s| s.is_closed()).await
    }
}

impl Outbound for Connection {
    fn send(&self, message: &OutboundMessage) -> SendOutcome {
        let state = self.state();
        if !state.is_open() {
            return SendOutcome::NotOpen(state);
        }
        let text = match encode_frame(message) {
            Ok(t) => t,
            Err(e) => {
                error!(connection = %self.id, kind = message.kind(), "{e}");
                return SendOutcome::EncodeFailed;
            }
        };
        match self.commands.send(Command::Frame(text)) {
            Ok(()) => SendOutcome::Queued,
            Err(_) => SendOutcome::NotOpen(self.state()),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

// ── Socket task ───────────────────────────────────────────────────────────────

struct SocketTask {
    id: Uuid,
    endpoint: Arc<str>,
    lifecycle: ConnectionLifecycle,
    state_tx: watch::Sender<ConnectionState>,
    events: mpsc::Sender<ChannelEvent>,
}

impl SocketTask {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        // ── Step 1: WebSocket handshake, abandoned on close() ─────────────────
        let endpoint = Arc::clone(&self.endpoint);
        let connect = connect_async(&*endpoint);
        tokio::pin!(connect);
        let connected = loop {
            tokio::select! {
                result = &mut connect => break result,
                command = commands.recv() => match command {
                    // `send` refuses frames until Open, so only a close can be here.
                    Some(Command::Frame(_)) => {}
                    Some(Command::Close) | None => {
                        let err = ConnectionError::ClosedBeforeOpen(self.endpoint.to_string());
                        self.transition(ConnectionState::ClosedUnclean, Some(err.to_string())).await;
                        return;
                    }
                },
            }
        };
        let ws_stream = match connected {
            Ok((ws, _response)) => ws,
            Err(source) => {
                let err = ConnectionError::Connect {
                    endpoint: self.endpoint.to_string(),
                    source,
                };
                self.transition(ConnectionState::ClosedUnclean, Some(err.to_string())).await;
                return;
            }
        };
        self.transition(ConnectionState::Open, None).await;

        // ── Step 2: Pump commands out and frames in ────────────────────────────
        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let mut closing = false;
        let close_deadline = sleep(CLOSE_TIMEOUT);
        tokio::pin!(close_deadline);

        let (final_state, reason) = loop {
            tokio::select! {
                command = commands.recv(), if !closing => match command {
                    Some(Command::Frame(text)) => {
                        if let Err(source) = ws_tx.send(WsMessage::Text(text)).await {
                            break self.transport_failure(source);
                        }
                    }
                    // `None`: every handle was dropped, which also closes.
                    Some(Command::Close) | None => {
                        closing = true;
                        close_deadline.as_mut().reset(Instant::now() + CLOSE_TIMEOUT);
                        if let Err(source) = ws_tx.send(WsMessage::Close(None)).await {
                            break self.transport_failure(source);
                        }
                    }
                },

                frame = ws_rx.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        self.emit(ChannelEvent::Frame(text)).await;
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        // The relay protocol is text-only.
                        self.emit(ChannelEvent::BinaryFrame(data.len())).await;
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        debug!(connection = %self.id, ?frame, "close frame received");
                        break (
                            ConnectionState::ClosedClean,
                            frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty()),
                        );
                    }
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                    Some(Err(source)) => break self.transport_failure(source),
                    None => {
                        let err = ConnectionError::Dropped(self.endpoint.to_string());
                        break (ConnectionState::ClosedUnclean, Some(err.to_string()));
                    }
                },

                () = &mut close_deadline, if closing => {
                    let err = ConnectionError::CloseTimeout(CLOSE_TIMEOUT);
                    break (ConnectionState::ClosedUnclean, Some(err.to_string()));
                }
            }
        };

        // ── Step 3: Flush the close reply and release the socket ───────────────
        match timeout(CLOSE_TIMEOUT, ws_tx.close()).await {
            Ok(Ok(())) | Ok(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {}
            Ok(Err(e)) => debug!(connection = %self.id, "error while closing socket: {e}"),
            Err(_) => debug!(connection = %self.id, "timed out flushing close frame"),
        }
        self.transition(final_state, reason).await;
    }

    fn transport_failure(&self, source: WsError) -> (ConnectionState, Option<String>) {
        let err = ConnectionError::Transport {
            endpoint: self.endpoint.to_string(),
            source,
        };
        (ConnectionState::ClosedUnclean, Some(err.to_string()))
    }

    async fn emit(&self, event: ChannelEvent) {
        if self.events.send(event).await.is_err() {
            debug!(connection = %self.id, "event receiver dropped; inbound event discarded");
        }
    }

    /// Applies a lifecycle transition: publish the state first, then the event,
    /// so a handler reacting to the event already sees the new state.
    async fn transition(&mut self, next: ConnectionState, reason: Option<String>) {
        let change = match self.lifecycle.advance(next, reason) {
            Ok(change) => change,
            Err(e) => {
                error!(connection = %self.id, "{e}");
                return;
            }
        };
        self.state_tx.send_replace(change.current);
        match (change.current, change.reason.as_deref()) {
            (ConnectionState::ClosedUnclean, reason) => {
                warn!(connection = %self.id, endpoint = %self.endpoint, reason, "relay connection lost")
            }
            (current, _) => info!(connection = %self.id, endpoint = %self.endpoint, %current, "relay connection state"),
        }
        self.emit(ChannelEvent::StateChanged(change)).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{SliderUpdateMessage, TouchEventMessage, TouchPhase};

    /// A handle whose socket task never existed.
    fn detached(state: ConnectionState) -> (Connection, mpsc::UnboundedReceiver<Command>, watch::Sender<ConnectionState>) {
        let (state_tx, state_rx) = watch::channel(state);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let conn = Connection {
            id: Uuid::new_v4(),
            endpoint: Arc::from("ws://test.invalid/touch_ws"),
            state: state_rx,
            commands: cmd_tx,
        };
        (conn, cmd_rx, state_tx)
    }

    fn touch_end() -> OutboundMessage {
        TouchEventMessage {
            ev: TouchPhase::End,
            touches: vec![],
        }
        .into()
    }

    #[test]
    fn test_send_while_connecting_is_not_open() {
        // Arrange
        let (conn, mut rx, _state) = detached(ConnectionState::Connecting);

        // Act
        let outcome = conn.send(&touch_end());

        // Assert
        assert_eq!(outcome, SendOutcome::NotOpen(ConnectionState::Connecting));
        assert!(rx.try_recv().is_err(), "nothing may be queued");
    }

    #[test]
    fn test_send_while_open_queues_encoded_frame() {
        let (conn, mut rx, _state) = detached(ConnectionState::Open);
        assert_eq!(conn.send(&touch_end()), SendOutcome::Queued);
        match rx.try_recv() {
            Ok(Command::Frame(text)) => assert_eq!(text, r#"{"ev":"touchend","touches":[]}"#),
            _ => panic!("expected a queued frame"),
        }
    }

    #[test]
    fn test_sends_are_queued_in_order() {
        // Arrange
        let (conn, mut rx, _state) = detached(ConnectionState::Open);

        // Act
        for v in 0..5 {
            conn.send(&SliderUpdateMessage::new("s", f64::from(v), true).into());
        }

        // Assert
        let mut values = Vec::new();
        while let Ok(Command::Frame(text)) = rx.try_recv() {
            let msg: SliderUpdateMessage = serde_json::from_str(&text).unwrap();
            values.push(msg.value);
        }
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_send_after_task_ended_is_not_open() {
        let (conn, rx, state) = detached(ConnectionState::Open);
        state.send_replace(ConnectionState::ClosedClean);
        drop(rx);
        assert_eq!(conn.send(&touch_end()), SendOutcome::NotOpen(ConnectionState::ClosedClean));
    }

    #[test]
    fn test_close_enqueues_close_command() {
        let (conn, mut rx, _state) = detached(ConnectionState::Open);
        conn.close();
        assert!(matches!(rx.try_recv(), Ok(Command::Close)));
    }

    #[tokio::test]
    async fn test_wait_until_returns_final_state_when_sender_drops() {
        let (conn, _rx, state) = detached(ConnectionState::Connecting);
        state.send_replace(ConnectionState::ClosedUnclean);
        drop(state);
        assert_eq!(conn.wait_until(|s| s.is_open()).await, ConnectionState::ClosedUnclean);
    }

    #[tokio::test]
    async fn test_closed_resolves_on_terminal_state() {
        let (conn, _rx, state) = detached(ConnectionState::Open);
        let waiter = {
            let conn = conn.clone();
            tokio::spawn(async move { conn.closed().await })
        };
        state.send_replace(ConnectionState::ClosedClean);
        assert_eq!(waiter.await.unwrap(), ConnectionState::ClosedClean);
    }

    #[test]
    fn test_closed_is_pending_until_terminal_state() {
        // Arrange
        let (conn, _rx, state) = detached(ConnectionState::Open);
        let mut closed = tokio_test::task::spawn(conn.closed());

        // Act / Assert
        tokio_test::assert_pending!(closed.poll());
        state.send_replace(ConnectionState::ClosedUnclean);
        assert!(closed.is_woken());
        assert_eq!(tokio_test::assert_ready!(closed.poll()), ConnectionState::ClosedUnclean);
    }

    #[test]
    fn test_connection_error_messages() {
        assert_eq!(
            ConnectionError::CloseTimeout(Duration::from_secs(2)).to_string(),
            "peer did not answer the close handshake within 2s"
        );
        assert_eq!(
            ConnectionError::Dropped("ws://x/touch_ws".into()).to_string(),
            "ws://x/touch_ws ended without a close handshake"
        );
        assert_eq!(
            ConnectionError::ClosedBeforeOpen("ws://x/touch_ws".into()).to_string(),
            "ws://x/touch_ws was closed before the handshake completed"
        );
    }
}
