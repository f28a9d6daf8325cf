//! relay-surface library crate.
//!
//! Everything a touch-relay surface needs around the pure logic of
//! `relay-core`: the WebSocket connection to the relay, the use cases that
//! drive it, and the input/status adapters of the command-line binary.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! native input (JSON lines / host)        relay server (WebSocket)
//!         │                                        ↕
//! [relay-surface]                                  │
//!   ├── domain/           SurfaceConfig (TOML + defaults)
//!   ├── application/      TouchCapture, SliderPanel, DisplaySurface,
//!   │                     ChannelDispatcher, Outbound seam
//!   └── infrastructure/
//!         ├── transport/     Connection (tokio-tungstenite client)
//!         ├── input_source/  InputSource trait, JSON-lines + mock sources
//!         └── status/        StatusSink that logs via tracing
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O beyond reading its own config file.
//! - `application` depends on `domain` and `relay-core`; it talks to the
//!   network only through the [`application::Outbound`] trait and the
//!   [`application::ChannelEvent`] stream, and reads input only through the
//!   `InputSource` trait.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.
//!
//! # For beginners: why this structure?
//!
//! The use cases can then be tested with a recording `Outbound` and a plain
//! channel of events, with no socket involved.  The integration tests in
//! `tests/` then run the real transport against a loopback relay.

/// Domain layer: configuration types.
pub mod domain;

/// Application layer: surface use cases.
pub mod application;

/// Infrastructure layer: WebSocket transport, input sources, status output.
pub mod infrastructure;
