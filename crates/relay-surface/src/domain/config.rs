//! Surface configuration.
//!
//! [`SurfaceConfig`] is the single source of truth for the runtime settings
//! of one surface.  It is built from defaults, optionally replaced by a TOML
//! file, and finally overridden by command-line flags / `RELAY_*` environment
//! variables in `main.rs`.
//!
//! ```toml
//! relay_url = "ws://192.168.1.20:8080"
//! coordinate_mode = "normalized"
//! log_level = "debug"
//!
//! [viewport]
//! width = 1024
//! height = 768
//!
//! [channels]
//! touch = "/touch_ws"
//!
//! [[sliders]]
//! name = "gain"
//! min = 0
//! max = "100"
//! ```
//!
//! Every field is optional.  `#[serde(default = "...")]` fills in whatever
//! the file leaves out, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use relay_core::{
    CoordinateError, CoordinateMode, LogicalChannel, SliderAttributes, StatusPalette, ViewportSize,
};

/// Error type for loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured viewport is unusable.
    #[error("invalid viewport in config: {0}")]
    Viewport(#[from] CoordinateError),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// All runtime configuration for one surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceConfig {
    /// Base URL of the relay server, without a path.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub channels: ChannelPaths,
    /// Must match every other surface on the same channel.
    #[serde(default)]
    pub coordinate_mode: CoordinateMode,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Overrides the built-in palette of the running surface.
    #[serde(default)]
    pub palette: Option<StatusPalette>,
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Sliders of the slider surface.
    #[serde(default)]
    pub sliders: Vec<SliderAttributes>,
}

/// Endpoint path of each logical channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelPaths {
    #[serde(default = "default_touch_path")]
    pub touch: String,
    #[serde(default = "default_display_path")]
    pub display: String,
    #[serde(default = "default_slider_path")]
    pub slider_control: String,
}

/// Size of the capture / render area in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

// ── Default value functions ───────────────────────────────────────────────────

fn default_relay_url() -> String {
    "ws://127.0.0.1:8080".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_touch_path() -> String {
    LogicalChannel::Touch.default_path().to_string()
}
fn default_display_path() -> String {
    LogicalChannel::Display.default_path().to_string()
}
fn default_slider_path() -> String {
    LogicalChannel::SliderControl.default_path().to_string()
}
fn default_viewport_width() -> f64 {
    800.0
}
fn default_viewport_height() -> f64 {
    600.0
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            channels: ChannelPaths::default(),
            coordinate_mode: CoordinateMode::default(),
            viewport: ViewportConfig::default(),
            palette: None,
            log_level: default_log_level(),
            sliders: Vec::new(),
        }
    }
}

impl Default for ChannelPaths {
    fn default() -> Self {
        Self {
            touch: default_touch_path(),
            display: default_display_path(),
            slider_control: default_slider_path(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl ChannelPaths {
    pub fn path(&self, channel: LogicalChannel) -> &str {
        match channel {
            LogicalChannel::Touch => &self.touch,
            LogicalChannel::Display => &self.display,
            LogicalChannel::SliderControl => &self.slider_control,
        }
    }
}

impl SurfaceConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read (including when
    /// it does not exist) and [`ConfigError::Parse`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Full WebSocket URL of `channel`.
    pub fn endpoint(&self, channel: LogicalChannel) -> String {
        let base = self.relay_url.trim_end_matches('/');
        let path = self.channels.path(channel);
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Validated viewport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Viewport`] for zero, negative, or non-finite
    /// dimensions.
    pub fn viewport(&self) -> Result<ViewportSize, ConfigError> {
        Ok(ViewportSize::new(self.viewport.width, self.viewport.height)?)
    }

    /// Palette for a surface on `channel`: the configured one if present,
    /// otherwise the console palette for sliders and the touch-pad palette
    /// for everything else.
    pub fn palette_for(&self, channel: LogicalChannel) -> StatusPalette {
        match (&self.palette, channel) {
            (Some(p), _) => p.clone(),
            (None, LogicalChannel::SliderControl) => StatusPalette::console(),
            (None, _) => StatusPalette::touch_pad(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::RawAttribute;
    use std::io::Write;

    #[test]
    fn test_default_relay_url_is_loopback() {
        let cfg = SurfaceConfig::default();
        assert_eq!(cfg.relay_url, "ws://127.0.0.1:8080");
    }

    #[test]
    fn test_default_mode_is_normalized() {
        assert_eq!(SurfaceConfig::default().coordinate_mode, CoordinateMode::Normalized);
    }

    #[test]
    fn test_default_log_level_is_info() {
        assert_eq!(SurfaceConfig::default().log_level, "info");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        // Arrange / Act
        let cfg = SurfaceConfig::from_toml_str("").unwrap();

        // Assert
        assert_eq!(cfg, SurfaceConfig::default());
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let cfg = SurfaceConfig {
            relay_url: "ws://relay.local:9000/".to_string(),
            ..SurfaceConfig::default()
        };
        assert_eq!(cfg.endpoint(LogicalChannel::Touch), "ws://relay.local:9000/touch_ws");
        assert_eq!(cfg.endpoint(LogicalChannel::SliderControl), "ws://relay.local:9000/console_ws");
    }

    #[test]
    fn test_endpoint_adds_missing_slash() {
        let mut cfg = SurfaceConfig::default();
        cfg.channels.display = "screen".to_string();
        assert_eq!(cfg.endpoint(LogicalChannel::Display), "ws://127.0.0.1:8080/screen");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        // Arrange
        let toml = r#"
            coordinate_mode = "pixel"

            [viewport]
            width = 1024

            [channels]
            touch = "/ws"
        "#;

        // Act
        let cfg = SurfaceConfig::from_toml_str(toml).unwrap();

        // Assert
        assert_eq!(cfg.coordinate_mode, CoordinateMode::Pixel);
        assert_eq!(cfg.viewport.width, 1024.0);
        assert_eq!(cfg.viewport.height, 600.0);
        assert_eq!(cfg.channels.touch, "/ws");
        assert_eq!(cfg.channels.display, "/display_ws");
    }

    #[test]
    fn test_sliders_parse_from_toml() {
        let toml = r#"
            [[sliders]]
            name = "gain"
            min = 0
            max = "100"

            [[sliders]]
            name = "master"
            min = 0
            max = 255
            global = true
        "#;
        let cfg = SurfaceConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.sliders.len(), 2);
        assert_eq!(cfg.sliders[0].max, Some(RawAttribute::Text("100".into())));
        assert!(cfg.sliders[1].global);
        assert_eq!(cfg.sliders[1].width, 400.0);
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let result = SurfaceConfig::from_toml_str(r#"coordinate_mode = "relative""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_viewport_is_rejected_when_used() {
        let cfg = SurfaceConfig::from_toml_str("[viewport]\nwidth = 0\n").unwrap();
        assert!(matches!(cfg.viewport(), Err(ConfigError::Viewport(_))));
    }

    #[test]
    fn test_palette_defaults_per_channel() {
        let cfg = SurfaceConfig::default();
        assert_eq!(cfg.palette_for(LogicalChannel::Touch), StatusPalette::touch_pad());
        assert_eq!(cfg.palette_for(LogicalChannel::SliderControl), StatusPalette::console());
    }

    #[test]
    fn test_configured_palette_wins() {
        let toml = r##"
            [palette]
            connecting = "#111"
            open = "#222"
            closed_clean = "#333"
            closed_unclean = "#444"
        "##;
        let cfg = SurfaceConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.palette_for(LogicalChannel::SliderControl).open, "#222");
    }

    #[test]
    fn test_load_reads_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "relay_url = \"ws://10.0.0.5:8080\"").unwrap();

        // Act
        let cfg = SurfaceConfig::load(file.path()).unwrap();

        // Assert
        assert_eq!(cfg.relay_url, "ws://10.0.0.5:8080");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SurfaceConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
