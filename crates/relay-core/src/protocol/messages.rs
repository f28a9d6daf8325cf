//! JSON messages exchanged with the relay server.
//!
//! Every message is one JSON object carried in one WebSocket text frame.
//! There is no envelope: which schema a frame follows is decided by the
//! logical channel it travels on (see [`super::channel::LogicalChannel`]).
//!
//! | channel | direction | shape |
//! |---|---|---|
//! | touch | surface → relay | `{"ev": "touchmove", "touches": [{"x": .., "y": ..}]}` |
//! | display | relay → surface | `{"pos": [{"x": .., "y": ..}]}` |
//! | slider | surface → relay | `{"ev": "sliderUpdate", "name": .., "value": .., "global": ..}` |

use serde::{Deserialize, Serialize};

use crate::domain::coords::Point;

/// Lifecycle phase of a native touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchPhase {
    /// The first pixel-mode touch panel sent `touchStart`; accept it on input.
    #[serde(rename = "touchstart", alias = "touchStart")]
    Start,
    #[serde(rename = "touchmove")]
    Move,
    #[serde(rename = "touchend")]
    End,
    /// The host aborted the gesture.  Still sent so displays can clear markers.
    #[serde(rename = "touchcancel")]
    Cancel,
}

impl TouchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TouchPhase::Start => "touchstart",
            TouchPhase::Move => "touchmove",
            TouchPhase::End => "touchend",
            TouchPhase::Cancel => "touchcancel",
        }
    }
}

/// One captured touch event: the phase plus every contact currently down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEventMessage {
    pub ev: TouchPhase,
    pub touches: Vec<Point>,
}

/// Event tag of [`SliderUpdateMessage`].  Only one value exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliderEvent {
    #[serde(rename = "sliderUpdate")]
    SliderUpdate,
}

/// A slider value change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderUpdateMessage {
    pub ev: SliderEvent,
    pub name: String,
    pub value: f64,
    /// `false` means the value lives in the reduced (max / 10) sub-range.
    pub global: bool,
}

impl SliderUpdateMessage {
    pub fn new(name: impl Into<String>, value: f64, global: bool) -> Self {
        Self {
            ev: SliderEvent::SliderUpdate,
            name: name.into(),
            value,
            global,
        }
    }
}

/// Snapshot of every position a display should currently show.
///
/// A full replacement, never a delta.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSet {
    pub pos: Vec<Point>,
}

impl PositionSet {
    pub fn new(pos: Vec<Point>) -> Self {
        Self { pos }
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

/// Anything an input surface sends.
///
/// Untagged: each variant already carries its own `ev` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Touch(TouchEventMessage),
    Slider(SliderUpdateMessage),
}

impl OutboundMessage {
    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Touch(m) => m.ev.as_str(),
            OutboundMessage::Slider(_) => "sliderUpdate",
        }
    }
}

impl From<TouchEventMessage> for OutboundMessage {
    fn from(m: TouchEventMessage) -> Self {
        OutboundMessage::Touch(m)
    }
}

impl From<SliderUpdateMessage> for OutboundMessage {
    fn from(m: SliderUpdateMessage) -> Self {
        OutboundMessage::Slider(m)
    }
}
