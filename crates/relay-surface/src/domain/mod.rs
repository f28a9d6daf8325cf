//! Domain layer for relay-surface.
//!
//! Only configuration lives here; the protocol types and state machines are
//! in `relay-core`.

pub mod config;

pub use config::{ChannelPaths, ConfigError, SurfaceConfig, ViewportConfig};
