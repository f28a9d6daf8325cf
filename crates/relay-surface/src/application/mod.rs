//! Application layer for relay-surface.
//!
//! The use cases know *what* a surface does with input and inbound frames;
//! the infrastructure layer provides the socket and the input sources.
//!
//! # Responsibilities
//!
//! - Sending one touch message per native touch event ([`TouchCapture`])
//! - Driving sliders and sending their updates ([`SliderControl`], [`SliderPanel`])
//! - Keeping markers equal to the latest snapshot ([`DisplaySurface`])
//! - Decoding inbound frames and routing them to handlers ([`ChannelDispatcher`])
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or spawning the socket task (infrastructure)
//! - Reading stdin or any other host input (infrastructure)

pub mod dispatch;
pub mod display;
pub mod outbound;
pub mod slider_control;
pub mod touch_capture;

pub use dispatch::{ChannelDispatcher, DispatchStats};
pub use display::DisplaySurface;
pub use outbound::{ChannelEvent, Outbound, SendOutcome};
pub use slider_control::{SliderControl, SliderInput, SliderPanel};
pub use touch_capture::{CaptureStats, TouchCapture};
