//! Logical channels of the relay.
//!
//! Each channel is a separate endpoint path on the relay server and carries a
//! single message schema.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalChannel {
    /// Touch events in; the relay echoes the merged `pos` snapshot back.
    Touch,
    /// `pos` snapshots pushed to display surfaces.
    Display,
    /// Slider updates from the console.
    SliderControl,
}

impl LogicalChannel {
    /// Endpoint path used when the configuration does not override it.
    pub fn default_path(self) -> &'static str {
        match self {
            LogicalChannel::Touch => "/touch_ws",
            LogicalChannel::Display => "/display_ws",
            LogicalChannel::SliderControl => "/console_ws",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalChannel::Touch => "touch",
            LogicalChannel::Display => "display",
            LogicalChannel::SliderControl => "slider-control",
        }
    }
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
