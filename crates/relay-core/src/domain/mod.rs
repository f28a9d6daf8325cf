//! Domain logic for touch-relay surfaces.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" here? (for beginners)
//!
//! Everything in this module can be driven from a plain unit test: no socket,
//! no runtime, no host window.  The infrastructure crate feeds these types with
//! real events (WebSocket frames, pointer input) and renders what they return.
//!
//! - [`coords`] converts between pixel-absolute and normalized coordinates.
//! - [`connection`] is the lifecycle state machine of one relay connection.
//! - [`indicator`] maps lifecycle transitions to a visible status signal.
//! - [`slider`] is the drag-driven slider widget.
//! - [`touch`] turns native multi-touch events into wire messages.
//! - [`reconcile`] redraws marker sets from position snapshots.

pub mod connection;
pub mod coords;
pub mod indicator;
pub mod reconcile;
pub mod slider;
pub mod touch;
