//! Coordinate normalizer.
//!
//! Touch surfaces report positions in device pixels, but two surfaces rarely
//! share a resolution.  The relay protocol therefore allows a *normalized*
//! coordinate space where each axis is a fraction of the viewport extent:
//! `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right.
//!
//! Values are deliberately **not** clamped.  A finger that slides off the
//! edge of the panel yields `x = 1.07`, and a display surface renders that
//! marker just outside its viewport.
//!
//! # Pixel vs normalized mode
//!
//! Every surface decides at startup which [`CoordinateMode`] it speaks.  All
//! surfaces on one logical channel must agree: a pixel producer paired with a
//! normalized consumer draws every marker in the top-left pixel.  Nothing on
//! the wire identifies the mode, so this is an operator-level configuration
//! contract, never something a surface tries to detect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building viewports or parsing coordinate settings.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    /// A viewport dimension was zero, negative, or not a finite number.
    #[error("viewport dimensions must be positive and finite, got {width}x{height}")]
    DegenerateViewport { width: f64, height: f64 },

    /// A `WIDTHxHEIGHT` string could not be parsed.
    #[error("invalid viewport '{0}': expected WIDTHxHEIGHT, e.g. 800x600")]
    InvalidViewportSpec(String),

    /// A coordinate mode name was not recognised.
    #[error("unknown coordinate mode '{0}': expected 'pixel' or 'normalized'")]
    UnknownMode(String),
}

/// A 2-D position.
///
/// The same type is used for pixel and normalized positions; which space a
/// point lives in is decided by the [`CoordinateMode`] of the surface holding
/// it.  On the wire it is the `{"x": .., "y": ..}` object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the surface area that input is captured on or markers are drawn in.
///
/// Construction is validated so that normalization can never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    width: f64,
    height: f64,
}

impl ViewportSize {
    /// Creates a viewport.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::DegenerateViewport`] unless both dimensions
    /// are finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, CoordinateError> {
        let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !valid {
            return Err(CoordinateError::DegenerateViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ViewportSize {
    type Err = CoordinateError;

    /// Parses `"800x600"` (an upper-case `X` is accepted too).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordinateError::InvalidViewportSpec(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

/// Converts a pixel-absolute point into normalized viewport fractions.
pub fn to_normalized(pixel: Point, viewport: ViewportSize) -> Point {
    Point {
        x: pixel.x / viewport.width,
        y: pixel.y / viewport.height,
    }
}

/// Converts a normalized point back into pixels.  Exact inverse of
/// [`to_normalized`] up to floating-point rounding.
pub fn to_pixels(normalized: Point, viewport: ViewportSize) -> Point {
    Point {
        x: normalized.x * viewport.width,
        y: normalized.y * viewport.height,
    }
}

/// Which coordinate space a surface speaks on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Positions are fractions of the viewport (resolution independent).
    #[default]
    Normalized,
    /// Positions are absolute pixels of the producing surface.
    Pixel,
}

impl CoordinateMode {
    /// Maps a captured pixel position to the coordinate that goes on the wire.
    pub fn to_wire(self, pixel: Point, viewport: ViewportSize) -> Point {
        match self {
            CoordinateMode::Normalized => to_normalized(pixel, viewport),
            CoordinateMode::Pixel => pixel,
        }
    }

    /// Maps a wire coordinate to the pixel position it is rendered at.
    pub fn to_render(self, wire: Point, viewport: ViewportSize) -> Point {
        match self {
            CoordinateMode::Normalized => to_pixels(wire, viewport),
            CoordinateMode::Pixel => wire,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateMode::Normalized => "normalized",
            CoordinateMode::Pixel => "pixel",
        }
    }
}

impl fmt::Display for CoordinateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateMode {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" | "normalised" => Ok(CoordinateMode::Normalized),
            "pixel" | "pixels" => Ok(CoordinateMode::Pixel),
            _ => Err(CoordinateError::UnknownMode(s.to_string())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
