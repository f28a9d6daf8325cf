//! Inbound event dispatch for one connection.
//!
//! [`ChannelDispatcher`] consumes the [`ChannelEvent`] stream of a
//! connection and calls at most two registered handlers:
//!
//! - the **message handler**, once per inbound frame that decodes as `M`;
//! - the **state handler**, once per lifecycle transition.
//!
//! Registering a handler again replaces the previous one.  Frames that do
//! not decode are logged and counted as dropped; they never stop the loop.
//! The loop ends after the first terminal (closed) state has been handled.

use std::ops::ControlFlow;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use relay_core::{decode_frame, LogicalChannel, ProtocolDecodeError, StateChange};

use super::outbound::ChannelEvent;

type MessageHandler<'a, M> = Box<dyn FnMut(M) + Send + 'a>;
type StateHandler<'a> = Box<dyn FnMut(&StateChange) + Send + 'a>;

/// Counters kept by a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames decoded and handed to the message handler.
    pub delivered: u64,
    /// Frames that failed to decode.
    pub dropped: u64,
    /// Frames that decoded while no message handler was registered.
    pub unhandled: u64,
    pub state_changes: u64,
}

pub struct ChannelDispatcher<'a, M> {
    channel: LogicalChannel,
    on_message: Option<MessageHandler<'a, M>>,
    on_state_change: Option<StateHandler<'a>>,
    stats: DispatchStats,
}

impl<'a, M: DeserializeOwned> ChannelDispatcher<'a, M> {
    pub fn new(channel: LogicalChannel) -> Self {
        Self {
            channel,
            on_message: None,
            on_state_change: None,
            stats: DispatchStats::default(),
        }
    }

    /// Registers the message handler, replacing any previous one.
    pub fn on_message(&mut self, handler: impl FnMut(M) + Send + 'a) -> &mut Self {
        self.on_message = Some(Box::new(handler));
        self
    }

    /// Registers the state handler, replacing any previous one.
    pub fn on_state_change(&mut self, handler: impl FnMut(&StateChange) + Send + 'a) -> &mut Self {
        self.on_state_change = Some(Box::new(handler));
        self
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Handles one event.  Breaks once the connection has closed.
    pub fn dispatch(&mut self, event: ChannelEvent) -> ControlFlow<()> {
        match event {
            ChannelEvent::StateChanged(change) => {
                self.stats.state_changes += 1;
                if let Some(handler) = self.on_state_change.as_mut() {
                    handler(&change);
                }
                if change.is_terminal() {
                    return ControlFlow::Break(());
                }
            }
            ChannelEvent::Frame(text) => match decode_frame::<M>(&text) {
                Ok(message) => match self.on_message.as_mut() {
                    Some(handler) => {
                        self.stats.delivered += 1;
                        handler(message);
                    }
                    None => {
                        self.stats.unhandled += 1;
                        debug!(channel = %self.channel, "frame decoded but no message handler is registered");
                    }
                },
                Err(e) => self.drop_frame(&e),
            },
            ChannelEvent::BinaryFrame(len) => self.drop_frame(&ProtocolDecodeError::UnexpectedBinary(len)),
        }
        ControlFlow::Continue(())
    }

    /// Dispatches events until the connection closes or the sender goes away.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChannelEvent>) -> DispatchStats {
        while let Some(event) = events.recv().await {
            if self.dispatch(event).is_break() {
                break;
            }
        }
        debug!(channel = %self.channel, stats = ?self.stats, "dispatcher finished");
        self.stats
    }

    fn drop_frame(&mut self, error: &ProtocolDecodeError) {
        self.stats.dropped += 1;
        warn!(channel = %self.channel, "dropping inbound frame: {error}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{ConnectionState, Point, PositionSet};

    fn change(previous: ConnectionState, current: ConnectionState) -> ChannelEvent {
        ChannelEvent::StateChanged(StateChange {
            previous,
            current,
            reason: None,
        })
    }

    fn frame(text: &str) -> ChannelEvent {
        ChannelEvent::Frame(text.to_string())
    }

    #[test]
    fn test_valid_frame_reaches_handler_once() {
        // Arrange
        let mut received = Vec::new();
        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
        d.on_message(|set| received.push(set));

        // Act
        d.dispatch(frame(r#"{"pos":[{"x":1,"y":2}]}"#));
        let stats = d.stats();
        drop(d);

        // Assert
        assert_eq!(received, vec![PositionSet::new(vec![Point::new(1.0, 2.0)])]);
        assert_eq!(stats.delivered, 1);
    }

    #[test]
    fn test_malformed_frame_is_dropped_and_loop_continues() {
        // Arrange
        let mut count = 0;
        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
        d.on_message(|_| count += 1);

        // Act
        let flow_bad = d.dispatch(frame("{oops"));
        let flow_good = d.dispatch(frame(r#"{"pos":[]}"#));
        let stats = d.stats();
        drop(d);

        // Assert
        assert!(flow_bad.is_continue());
        assert!(flow_good.is_continue());
        assert_eq!(count, 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.delivered, 1);
    }

    #[test]
    fn test_binary_frame_is_dropped() {
        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
        d.dispatch(ChannelEvent::BinaryFrame(4));
        assert_eq!(d.stats().dropped, 1);
    }

    #[test]
    fn test_second_registration_replaces_first_handler() {
        // Arrange
        let mut first = 0;
        let mut second = 0;
        {
            let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
            d.on_message(|_| first += 1);
            d.on_message(|_| second += 1);

            // Act
            d.dispatch(frame(r#"{"pos":[]}"#));
        }

        // Assert
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn test_frame_without_handler_is_counted_unhandled() {
        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
        d.dispatch(frame(r#"{"pos":[]}"#));
        assert_eq!(d.stats().unhandled, 1);
        assert_eq!(d.stats().delivered, 0);
    }

    #[test]
    fn test_terminal_state_breaks_after_handler_runs() {
        // Arrange
        let mut seen = Vec::new();
        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Touch);
        d.on_state_change(|c| seen.push(c.current));

        // Act
        let open = d.dispatch(change(ConnectionState::Connecting, ConnectionState::Open));
        let closed = d.dispatch(change(ConnectionState::Open, ConnectionState::ClosedUnclean));
        drop(d);

        // Assert
        assert!(open.is_continue());
        assert!(closed.is_break());
        assert_eq!(seen, vec![ConnectionState::Open, ConnectionState::ClosedUnclean]);
    }

    #[tokio::test]
    async fn test_run_stops_at_close_and_reports_stats() {
        // Arrange
        let (tx, rx) = mpsc::channel(8);
        tx.send(change(ConnectionState::Connecting, ConnectionState::Open)).await.unwrap();
        tx.send(frame(r#"{"pos":[{"x":0.5,"y":0.5}]}"#)).await.unwrap();
        tx.send(frame("garbage")).await.unwrap();
        tx.send(change(ConnectionState::Open, ConnectionState::ClosedClean)).await.unwrap();
        tx.send(frame(r#"{"pos":[]}"#)).await.unwrap();

        let mut d = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display);
        d.on_message(|_| {});

        // Act
        let stats = d.run(rx).await;

        // Assert
        assert_eq!(
            stats,
            DispatchStats {
                delivered: 1,
                dropped: 1,
                unhandled: 0,
                state_changes: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_run_ends_when_sender_is_dropped() {
        let (tx, rx) = mpsc::channel::<ChannelEvent>(1);
        drop(tx);
        let stats = ChannelDispatcher::<PositionSet>::new(LogicalChannel::Display).run(rx).await;
        assert_eq!(stats, DispatchStats::default());
    }
}
