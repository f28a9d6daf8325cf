//! Drag-driven slider widget.
//!
//! A slider is a horizontal track of `width` pixels with a handle the user
//! drags.  Each widget runs a two-state machine:
//!
//! ```text
//!        press                move (emit)
//! Idle ─────────► Dragging ◄──────────┐
//!  ▲    (emit)       │  └─────────────┘
//!  └─────────────────┘
//!     release (emit)
//! ```
//!
//! Moves and releases that arrive while Idle are ignored: no value, no handle
//! movement, no message.
//!
//! # Global vs. fine sliders
//!
//! A *non-global* slider controls a secondary, fine-grained parameter.  Its
//! declared `max` is divided by [`NON_GLOBAL_SCALE`] before the range is
//! computed, so `min=0, max=100` spans `0..=10`.  The reduced range is used
//! for both the value computation and the handle placement.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::protocol::messages::SliderUpdateMessage;

/// Divisor applied to `max` of non-global sliders.
pub const NON_GLOBAL_SCALE: f64 = 10.0;

const DEFAULT_WIDTH: f64 = 400.0;
const DEFAULT_HANDLE_WIDTH: f64 = 20.0;

/// A slider's declared attributes cannot drive a widget.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("slider '{slider}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        slider: String,
        attribute: &'static str,
    },

    #[error("slider '{slider}' attribute '{attribute}' is not a number: '{raw}'")]
    InvalidNumber {
        slider: String,
        attribute: &'static str,
        raw: String,
    },

    #[error("slider '{slider}' has invalid {attribute} {value}: must be finite and positive")]
    InvalidWidth {
        slider: String,
        attribute: &'static str,
        value: f64,
    },

    #[error("slider '{slider}' has an empty range (min {min}, effective max {max})")]
    EmptyRange { slider: String, min: f64, max: f64 },

    #[error("duplicate slider name '{0}'")]
    DuplicateName(String),
}

/// A numeric attribute as declared by the host: a number, or text that
/// should contain one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAttribute {
    Number(f64),
    Text(String),
}

impl RawAttribute {
    fn parse(&self, slider: &str, attribute: &'static str) -> Result<f64, ConfigurationError> {
        let parsed = match self {
            RawAttribute::Number(n) => Some(*n),
            RawAttribute::Text(s) => s.trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(ConfigurationError::InvalidNumber {
                slider: slider.to_string(),
                attribute,
                raw: match self {
                    RawAttribute::Number(n) => n.to_string(),
                    RawAttribute::Text(s) => s.clone(),
                },
            }),
        }
    }
}

impl From<f64> for RawAttribute {
    fn from(n: f64) -> Self {
        RawAttribute::Number(n)
    }
}

impl From<&str> for RawAttribute {
    fn from(s: &str) -> Self {
        RawAttribute::Text(s.to_string())
    }
}

/// Attributes of one slider as declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min: Option<RawAttribute>,
    #[serde(default)]
    pub max: Option<RawAttribute>,
    /// Initial value; the handle starts at `min` when absent.
    #[serde(default)]
    pub value: Option<RawAttribute>,
    #[serde(default)]
    pub global: bool,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_handle_width")]
    pub handle_width: f64,
}

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_handle_width() -> f64 {
    DEFAULT_HANDLE_WIDTH
}

impl SliderAttributes {
    pub fn new(name: impl Into<String>, min: impl Into<RawAttribute>, max: impl Into<RawAttribute>) -> Self {
        Self {
            name: Some(name.into()),
            min: Some(min.into()),
            max: Some(max.into()),
            ..Self::default()
        }
    }

    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    pub fn with_value(mut self, value: impl Into<RawAttribute>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_width(mut self, width: f64, handle_width: f64) -> Self {
        self.width = width;
        self.handle_width = handle_width;
        self
    }
}

impl Default for SliderAttributes {
    fn default() -> Self {
        Self {
            name: None,
            min: None,
            max: None,
            value: None,
            global: false,
            width: DEFAULT_WIDTH,
            handle_width: DEFAULT_HANDLE_WIDTH,
        }
    }
}

/// Validated slider geometry and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderConfig {
    pub name: String,
    pub min: f64,
    /// Effective max: already divided by [`NON_GLOBAL_SCALE`] for fine sliders.
    pub max: f64,
    pub global: bool,
    pub width: f64,
    pub handle_width: f64,
}

impl SliderConfig {
    /// Validates raw attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for a missing name or bound, a bound
    /// that is not a number, a non-positive width, or a zero-width range.
    pub fn from_attributes(attrs: &SliderAttributes) -> Result<Self, ConfigurationError> {
        let name = match attrs.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                return Err(ConfigurationError::MissingAttribute {
                    slider: "<unnamed>".to_string(),
                    attribute: "name",
                })
            }
        };
        let required = |raw: &Option<RawAttribute>, attribute: &'static str| match raw {
            Some(r) => r.parse(&name, attribute),
            None => Err(ConfigurationError::MissingAttribute {
                slider: name.clone(),
                attribute,
            }),
        };
        let min = required(&attrs.min, "min")?;
        let declared_max = required(&attrs.max, "max")?;

        if !(attrs.width.is_finite() && attrs.width > 0.0) {
            return Err(ConfigurationError::InvalidWidth {
                slider: name,
                attribute: "width",
                value: attrs.width,
            });
        }
        if !(attrs.handle_width.is_finite() && attrs.handle_width >= 0.0) {
            return Err(ConfigurationError::InvalidWidth {
                slider: name,
                attribute: "handle_width",
                value: attrs.handle_width,
            });
        }

        let max = if attrs.global {
            declared_max
        } else {
            declared_max / NON_GLOBAL_SCALE
        };
        if max - min == 0.0 {
            return Err(ConfigurationError::EmptyRange { slider: name, min, max });
        }

        Ok(Self {
            name,
            min,
            max,
            global: attrs.global,
            width: attrs.width,
            handle_width: attrs.handle_width,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Value under a pointer at `x` pixels from the left edge of the track.
    /// Not clamped.
    pub fn value_at(&self, x: f64) -> f64 {
        x / self.width * self.range() + self.min
    }

    /// Left offset of the handle for `value`, truncated to whole pixels.
    ///
    /// Computed as `(value / range - min) * width - handle_width / 2`.  May
    /// fall outside the track.
    pub fn handle_left(&self, value: f64) -> f64 {
        ((value / self.range() - self.min) * self.width - self.handle_width / 2.0).trunc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Press,
    Move,
    Release,
}

/// Pointer input on a slider track; `x` is relative to the track's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
}

impl PointerEvent {
    pub fn press(x: f64) -> Self {
        Self { kind: PointerKind::Press, x }
    }

    pub fn move_to(x: f64) -> Self {
        Self { kind: PointerKind::Move, x }
    }

    pub fn release(x: f64) -> Self {
        Self { kind: PointerKind::Release, x }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderPhase {
    Idle,
    Dragging,
}

/// Result of an accepted pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderUpdate {
    pub value: f64,
    pub handle_left: f64,
}

/// One live slider.
#[derive(Debug, Clone)]
pub struct SliderWidget {
    config: SliderConfig,
    phase: SliderPhase,
    value: f64,
    handle_left: f64,
}

impl SliderWidget {
    /// Validates `attrs` and places the handle at the declared initial value.
    ///
    /// # Errors
    ///
    /// See [`SliderConfig::from_attributes`]; an unparsable `value` is an
    /// error too.
    pub fn activate(attrs: &SliderAttributes) -> Result<Self, ConfigurationError> {
        let config = SliderConfig::from_attributes(attrs)?;
        let value = match &attrs.value {
            Some(raw) => raw.parse(&config.name, "value")?,
            None => config.min,
        };
        let handle_left = config.handle_left(value);
        debug!(slider = %config.name, value, handle_left, "slider activated");
        Ok(Self {
            config,
            phase: SliderPhase::Idle,
            value,
            handle_left,
        })
    }

    /// Feeds one pointer event through the state machine.
    ///
    /// Returns the new value and handle position when the event is accepted,
    /// `None` when it is ignored.
    pub fn handle(&mut self, event: PointerEvent) -> Option<SliderUpdate> {
        match (self.phase, event.kind) {
            (_, PointerKind::Press) => self.phase = SliderPhase::Dragging,
            (SliderPhase::Dragging, PointerKind::Move) => {}
            (SliderPhase::Dragging, PointerKind::Release) => self.phase = SliderPhase::Idle,
            (SliderPhase::Idle, kind) => {
                debug!(slider = %self.config.name, ?kind, "pointer event ignored while idle");
                return None;
            }
        }
        self.value = self.config.value_at(event.x);
        self.handle_left = self.config.handle_left(self.value);
        Some(SliderUpdate {
            value: self.value,
            handle_left: self.handle_left,
        })
    }

    /// Wire message announcing `update`.
    pub fn to_message(&self, update: &SliderUpdate) -> SliderUpdateMessage {
        SliderUpdateMessage::new(self.config.name.clone(), update.value, self.config.global)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    pub fn phase(&self) -> SliderPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == SliderPhase::Dragging
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn handle_left(&self) -> f64 {
        self.handle_left
    }
}

/// Activates every slider in `attrs`, rejecting duplicate names.
///
/// # Errors
///
/// Returns the first [`ConfigurationError`] encountered.
pub fn activate_all(attrs: &[SliderAttributes]) -> Result<Vec<SliderWidget>, ConfigurationError> {
    let mut seen = HashSet::new();
    let mut widgets = Vec::with_capacity(attrs.len());
    for a in attrs {
        let widget = SliderWidget::activate(a)?;
        if !seen.insert(widget.name().to_string()) {
            return Err(ConfigurationError::DuplicateName(widget.name().to_string()));
        }
        widgets.push(widget);
    }
    Ok(widgets)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
