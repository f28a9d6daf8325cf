//! Native input sources.
//!
//! A surface does not read touch or pointer hardware itself.  The host (a
//! window toolkit, a browser shim, a test) produces native events and an
//! [`InputSource`] hands them over through a `std::sync::mpsc` channel, so
//! the producer can run on its own thread and never waits on the network.
//!
//! # Testability
//!
//! [`mock::MockInputSource`] lets tests inject events directly.
//! [`lines::LineSource`] reads one JSON event per line from any reader, which
//! is how the command-line binary is driven.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tracing::debug;

pub mod lines;
pub mod mock;

/// How long [`pump`] waits for an event before re-checking `running`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Error type for input sources.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("input source has already been started")]
    AlreadyStarted,
    #[error("input source has already been stopped")]
    AlreadyStopped,
    #[error("failed to spawn input reader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Produces native input events of type `E`.
pub trait InputSource<E>: Send {
    /// Starts the source and returns a receiver for its events.
    fn start(&self) -> Result<mpsc::Receiver<E>, CaptureError>;
    /// Stops the source; the receiver disconnects once buffered events drain.
    fn stop(&self);
    /// Tells the host not to run its own default handling (scrolling, zoom,
    /// text selection) for the event that was just received.
    fn suppress_default(&self);
}

/// Starts `source` and feeds every event to `handle` until `running` is
/// cleared or the source disconnects.  Returns the number of events handled.
///
/// `suppress_default` is called for every event before it is handled.
///
/// # Errors
///
/// Returns [`CaptureError`] if the source cannot be started.
pub fn pump<E, S, F>(source: &S, running: &AtomicBool, mut handle: F) -> Result<u64, CaptureError>
where
    S: InputSource<E> + ?Sized,
    F: FnMut(E),
{
    let rx = source.start()?;
    let mut handled = 0u64;
    loop {
        if !running.load(Ordering::Relaxed) {
            debug!("running flag cleared; stopping input pump");
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                source.suppress_default();
                handle(event);
                handled += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("input source disconnected");
                break;
            }
        }
    }
    source.stop();
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::mock::MockInputSource;
    use super::*;

    #[test]
    fn test_pump_handles_events_until_source_stops() {
        // Arrange
        let source = MockInputSource::<u32>::new();
        let running = AtomicBool::new(true);
        let feeder = source.clone();
        let mut seen = Vec::new();

        // Act
        let handle = std::thread::spawn(move || {
            feeder.wait_until_started();
            feeder.inject_event(1);
            feeder.inject_event(2);
            feeder.disconnect();
        });
        let handled = pump(&source, &running, |e| seen.push(e)).unwrap();
        handle.join().unwrap();

        // Assert
        assert_eq!(handled, 2);
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(source.suppress_count(), 2);
    }

    #[test]
    fn test_pump_exits_when_running_is_cleared() {
        let source = MockInputSource::<u32>::new();
        let running = AtomicBool::new(false);
        let handled = pump(&source, &running, |_| {}).unwrap();
        assert_eq!(handled, 0);
        assert!(source.is_stopped());
    }

    #[test]
    fn test_pump_propagates_start_failure() {
        let source = MockInputSource::<u32>::new();
        source.start().unwrap();
        let running = AtomicBool::new(true);
        assert!(matches!(
            pump(&source, &running, |_| {}),
            Err(CaptureError::AlreadyStarted)
        ));
    }
}
