//! SliderControl / SliderPanel: pointer input on sliders in, slider updates out.
//!
//! [`SliderControl`] wraps one [`SliderWidget`] and sends a
//! `sliderUpdate` for every event the widget accepts: press, every move while
//! dragging, and release.  [`SliderPanel`] owns all sliders of a surface and
//! routes input to them by name.

use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use relay_core::domain::slider::activate_all;
use relay_core::{ConfigurationError, OutboundMessage, PointerEvent, SliderAttributes, SliderWidget};

use super::outbound::{Outbound, SendOutcome};
use crate::infrastructure::input_source::{pump, CaptureError, InputSource};

pub struct SliderControl<O: Outbound> {
    widget: SliderWidget,
    outbound: O,
}

impl<O: Outbound> SliderControl<O> {
    pub fn new(widget: SliderWidget, outbound: O) -> Self {
        Self { widget, outbound }
    }

    /// Activates a slider from its declared attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the attributes cannot drive a slider.
    pub fn activate(attrs: &SliderAttributes, outbound: O) -> Result<Self, ConfigurationError> {
        Ok(Self::new(SliderWidget::activate(attrs)?, outbound))
    }

    /// Feeds one pointer event to the widget.
    ///
    /// Returns `None` when the widget ignored the event (move or release
    /// while idle); nothing is sent in that case.
    pub fn handle(&mut self, event: PointerEvent) -> Option<SendOutcome> {
        let update = self.widget.handle(event)?;
        let message = self.widget.to_message(&update);
        let outcome = self.outbound.send(&OutboundMessage::Slider(message));
        match outcome {
            SendOutcome::Queued => trace!(
                slider = self.widget.name(),
                value = update.value,
                handle_left = update.handle_left,
                "slider update queued"
            ),
            other => debug!(slider = self.widget.name(), outcome = ?other, "slider update not sent"),
        }
        Some(outcome)
    }

    pub fn widget(&self) -> &SliderWidget {
        &self.widget
    }
}

/// Pointer input addressed to a slider by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderInput {
    pub slider: String,
    #[serde(flatten)]
    pub event: PointerEvent,
}

/// All sliders of one surface, sharing one outbound connection.
pub struct SliderPanel<O: Outbound + Clone> {
    controls: Vec<SliderControl<O>>,
}

impl<O: Outbound + Clone> SliderPanel<O> {
    /// Activates every declared slider.  Fails on the first bad declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for invalid attributes or duplicate names.
    pub fn activate_all(attrs: &[SliderAttributes], outbound: O) -> Result<Self, ConfigurationError> {
        let controls = activate_all(attrs)?
            .into_iter()
            .map(|widget| SliderControl::new(widget, outbound.clone()))
            .collect::<Vec<_>>();
        debug!(count = controls.len(), "slider panel activated");
        Ok(Self { controls })
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn control(&self, name: &str) -> Option<&SliderControl<O>> {
        self.controls.iter().find(|c| c.widget.name() == name)
    }

    /// Routes `input` to its slider.  Unknown names are logged and ignored.
    pub fn handle(&mut self, input: &SliderInput) -> Option<SendOutcome> {
        match self.controls.iter_mut().find(|c| c.widget.name() == input.slider) {
            Some(control) => control.handle(input.event),
            None => {
                warn!(slider = %input.slider, "input for unknown slider ignored");
                None
            }
        }
    }

    /// Pumps `source` until `running` is cleared or the source ends.
    /// Returns the number of inputs handled.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if the source cannot be started.
    pub fn run<S>(&mut self, source: &S, running: &AtomicBool) -> Result<u64, CaptureError>
    where
        S: InputSource<SliderInput> + ?Sized,
    {
        pump(source, running, |input: SliderInput| {
            self.handle(&input);
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::outbound::testing::RecordingOutbound;
    use relay_core::{ConnectionState, SliderUpdateMessage};

    fn gain() -> SliderAttributes {
        SliderAttributes::new("gain", 0.0, 100.0).with_width(200.0, 20.0)
    }

    fn slider_messages(out: &RecordingOutbound) -> Vec<SliderUpdateMessage> {
        out.sent()
            .into_iter()
            .map(|m| match m {
                OutboundMessage::Slider(s) => s,
                other => panic!("expected slider message, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_drag_emits_on_press_every_move_and_release() {
        // Arrange
        let out = RecordingOutbound::open();
        let mut control = SliderControl::activate(&gain(), out.clone()).unwrap();

        // Act
        control.handle(PointerEvent::press(0.0));
        control.handle(PointerEvent::move_to(100.0));
        control.handle(PointerEvent::move_to(150.0));
        control.handle(PointerEvent::release(200.0));

        // Assert
        let values: Vec<f64> = slider_messages(&out).iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0.0, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_move_before_press_sends_nothing() {
        // Arrange
        let out = RecordingOutbound::open();
        let mut control = SliderControl::activate(&gain(), out.clone()).unwrap();
        let handle_before = control.widget().handle_left();

        // Act
        let outcome = control.handle(PointerEvent::move_to(120.0));

        // Assert
        assert!(outcome.is_none());
        assert!(out.sent().is_empty());
        assert_eq!(control.widget().handle_left(), handle_before);
    }

    #[test]
    fn test_non_global_full_width_sends_ten() {
        let out = RecordingOutbound::open();
        let mut control = SliderControl::activate(&gain(), out.clone()).unwrap();
        control.handle(PointerEvent::press(200.0));
        assert_eq!(
            slider_messages(&out),
            vec![SliderUpdateMessage::new("gain", 10.0, false)]
        );
    }

    #[test]
    fn test_closed_connection_is_reported_not_fatal() {
        let out = RecordingOutbound::in_state(ConnectionState::ClosedUnclean);
        let mut control = SliderControl::activate(&gain(), out.clone()).unwrap();
        let outcome = control.handle(PointerEvent::press(10.0));
        assert_eq!(outcome, Some(SendOutcome::NotOpen(ConnectionState::ClosedUnclean)));
        assert!(control.widget().is_dragging());
    }

    #[test]
    fn test_panel_routes_by_name() {
        // Arrange
        let out = RecordingOutbound::open();
        let attrs = vec![gain(), SliderAttributes::new("master", 0.0, 1.0).global(true)];
        let mut panel = SliderPanel::activate_all(&attrs, out.clone()).unwrap();

        // Act
        panel.handle(&SliderInput {
            slider: "master".into(),
            event: PointerEvent::press(200.0),
        });

        // Assert
        let sent = slider_messages(&out);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "master");
        assert!(sent[0].global);
        assert_eq!(sent[0].value, 0.5);
        assert!(panel.control("master").unwrap().widget().is_dragging());
        assert!(!panel.control("gain").unwrap().widget().is_dragging());
    }

    #[test]
    fn test_panel_ignores_unknown_slider() {
        let out = RecordingOutbound::open();
        let mut panel = SliderPanel::activate_all(&[gain()], out.clone()).unwrap();
        let outcome = panel.handle(&SliderInput {
            slider: "volume".into(),
            event: PointerEvent::press(1.0),
        });
        assert!(outcome.is_none());
        assert!(out.sent().is_empty());
    }

    #[test]
    fn test_panel_activation_fails_fast_on_bad_attribute() {
        let out = RecordingOutbound::open();
        let attrs = vec![gain(), SliderAttributes::new("broken", "low", 1.0)];
        assert!(matches!(
            SliderPanel::activate_all(&attrs, out),
            Err(ConfigurationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_slider_input_json_is_flat() {
        let input: SliderInput =
            serde_json::from_str(r#"{"slider":"gain","kind":"move","x":3}"#).unwrap();
        assert_eq!(input.event, PointerEvent::move_to(3.0));
    }
}
