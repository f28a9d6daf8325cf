//! Infrastructure layer for relay-surface.
//!
//! Concrete implementations of the seams the application layer uses:
//!
//! - [`transport`]: the WebSocket [`Connection`] to the relay
//! - [`input_source`]: where native touch and pointer events come from
//! - [`status`]: where connection indicator signals go

pub mod input_source;
pub mod status;
pub mod transport;

pub use input_source::{CaptureError, InputSource};
pub use status::TracingStatusSink;
pub use transport::{Connection, ConnectionError};
