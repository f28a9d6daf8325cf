//! # relay-core
//!
//! Shared library for touch-relay surfaces containing the wire protocol, the
//! coordinate normalizer, and the pure state machines behind every surface.
//!
//! This crate is used by every surface binary.  It has zero dependencies on
//! sockets, async runtimes, or host UI toolkits.
//!
//! # Architecture overview (for beginners)
//!
//! A *surface* is one running instance of a page-like client.  Input surfaces
//! (a touch panel, a bank of sliders) send what the user does to a relay
//! server; display surfaces draw crosshair markers wherever the relay says
//! somebody is touching.  The relay itself is somebody else's process: this
//! workspace only speaks its wire format.
//!
//! ```text
//! touch / slider input ──► normalize ──► JSON frame ──► relay (external)
//!                                                          │
//! display markers ◄── reconcile ◄── PositionSet ◄──────────┘
//! ```
//!
//! This crate (`relay-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – The JSON messages that travel over each logical channel
//!   and the encode/decode helpers for them.
//!
//! - **`domain`** – Pure logic with no I/O: coordinate normalization, the
//!   connection lifecycle and its status indicator, the slider widget state
//!   machine, touch-event translation, and the position reconciler.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::PositionReconciler` instead of the full module path.
pub use domain::connection::{ConnectionLifecycle, ConnectionState, LifecycleError, StateChange};
pub use domain::coords::{to_normalized, to_pixels, CoordinateError, CoordinateMode, Point, ViewportSize};
pub use domain::indicator::{ConnectionIndicator, IndicatorSignal, StatusPalette, StatusSink};
pub use domain::reconcile::{MarkerLayer, MarkerSurface, PositionReconciler, ReconcileReport};
pub use domain::slider::{
    ConfigurationError, PointerEvent, PointerKind, RawAttribute, SliderAttributes, SliderConfig,
    SliderPhase, SliderUpdate, SliderWidget,
};
pub use domain::touch::{ContactPoint, NativeTouchEvent, TouchTranslator};
pub use protocol::channel::LogicalChannel;
pub use protocol::codec::{decode_frame, encode_frame, EncodeError, ProtocolDecodeError};
pub use protocol::messages::{
    OutboundMessage, PositionSet, SliderUpdateMessage, TouchEventMessage, TouchPhase,
};
