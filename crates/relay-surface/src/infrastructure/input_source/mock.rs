//! Mock input source for unit testing.
//!
//! Lets tests inject synthetic native events without a host window or a
//! reader thread.  Clones share state, so one clone can be moved to a feeder
//! thread while the other is being pumped.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::time::Duration;

use super::{CaptureError, InputSource};

struct Shared<E> {
    sender: Option<Sender<E>>,
    started: bool,
    stopped: bool,
    suppress_count: u32,
}

pub struct MockInputSource<E> {
    shared: Arc<Mutex<Shared<E>>>,
}

impl<E> MockInputSource<E> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                sender: None,
                started: false,
                stopped: false,
                suppress_count: 0,
            })),
        }
    }

    /// Injects a synthetic event, as if the host had produced it.
    ///
    /// Panics if `start()` has not been called or the source was stopped.
    pub fn inject_event(&self, event: E) {
        let guard = self.shared.lock().expect("lock poisoned");
        match guard.sender {
            Some(ref sender) => sender
                .send(event)
                .expect("receiver has been dropped; call start() first"),
            None => panic!("MockInputSource::inject_event called before start()"),
        }
    }

    /// Drops the sender as if the host had gone away.
    pub fn disconnect(&self) {
        self.shared.lock().expect("lock poisoned").sender = None;
    }

    /// Blocks until `start()` has been called on any clone.
    pub fn wait_until_started(&self) {
        while !self.shared.lock().expect("lock poisoned").started {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Number of times `suppress_default` was called.
    pub fn suppress_count(&self) -> u32 {
        self.shared.lock().expect("lock poisoned").suppress_count
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().expect("lock poisoned").stopped
    }
}

impl<E> Clone for MockInputSource<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> Default for MockInputSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send> InputSource<E> for MockInputSource<E> {
    fn start(&self) -> Result<mpsc::Receiver<E>, CaptureError> {
        let mut guard = self.shared.lock().expect("lock poisoned");
        if guard.started {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        guard.sender = Some(tx);
        guard.started = true;
        Ok(rx)
    }

    fn stop(&self) {
        let mut guard = self.shared.lock().expect("lock poisoned");
        guard.sender = None;
        guard.stopped = true;
    }

    fn suppress_default(&self) {
        self.shared.lock().expect("lock poisoned").suppress_count += 1;
    }
}
