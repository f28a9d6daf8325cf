//! JSON-lines input source.
//!
//! Reads one native event per line, e.g. for a touch surface:
//!
//! ```text
//! {"phase":"touchstart","contacts":[{"id":0,"x":400,"y":150}]}
//! {"phase":"touchend","contacts":[]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.  A line that does not
//! parse is logged and skipped; it does not end the stream.
//!
//! The reader runs on a dedicated thread so a blocking `read` never stalls
//! the async runtime.

use std::io::{self, BufRead, BufReader};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use super::{CaptureError, InputSource};

type BoxedReader = Box<dyn BufRead + Send>;

pub struct LineSource<E> {
    reader: Mutex<Option<BoxedReader>>,
    stopped: Arc<AtomicBool>,
    suppressed: AtomicU64,
    _event: PhantomData<fn() -> E>,
}

impl<E> LineSource<E> {
    pub fn new(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Mutex::new(Some(Box::new(reader))),
            stopped: Arc::new(AtomicBool::new(false)),
            suppressed: AtomicU64::new(0),
            _event: PhantomData,
        }
    }

    /// Reads events from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }

    /// Number of events whose default handling was suppressed.
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}

impl<E: DeserializeOwned + Send + 'static> InputSource<E> for LineSource<E> {
    fn start(&self) -> Result<mpsc::Receiver<E>, CaptureError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| CaptureError::AlreadyStopped)?
            .take()
            .ok_or(CaptureError::AlreadyStarted)?;
        if self.stopped.load(Ordering::Relaxed) {
            return Err(CaptureError::AlreadyStopped);
        }
        let (tx, rx) = mpsc::channel();
        let stopped = Arc::clone(&self.stopped);
        thread::Builder::new()
            .name("relay-input".to_string())
            .spawn(move || read_lines(reader, tx, stopped))?;
        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    fn suppress_default(&self) {
        // A line-driven host has no default gesture handling to cancel.
        self.suppressed.fetch_add(1, Ordering::Relaxed);
        trace!("default handling suppressed");
    }
}

fn read_lines<E: DeserializeOwned>(reader: BoxedReader, tx: mpsc::Sender<E>, stopped: Arc<AtomicBool>) {
    for (index, line) in reader.lines().enumerate() {
        if stopped.load(Ordering::Relaxed) {
            break;
        }
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("input read error: {e}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<E>(trimmed) {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!(line = index + 1, "skipping malformed input line: {e}"),
        }
    }
    debug!("input reader finished");
}
