use crate::geometry::{Frame, Vector3};

use super::event::{EventKind, TrackEvent};

/// World-space counterpart of one block, or of one subdivision after smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackElement {
    /// Track position at which the element begins.
    pub start: f64,
    pub position: Vector3,
    pub frame: Frame,
    /// Gradient as rise over run.
    pub pitch: f64,
    pub curve_radius: f64,
    pub curve_cant: f64,
    pub curve_cant_tangent: f64,
    pub accuracy: f64,
    pub adhesion_multiplier: f64,
    pub events: Vec<TrackEvent>,
}

impl TrackElement {
    pub fn new(start: f64, position: Vector3, frame: Frame) -> Self {
        Self {
            start,
            position,
            frame,
            ..Self::default()
        }
    }

    /// Appends an event and returns its index in this element.
    pub fn push_event(&mut self, delta: f64, kind: EventKind) -> usize {
        self.events.push(TrackEvent::new(delta, kind));
        self.events.len() - 1
    }
}

impl Default for TrackElement {
    fn default() -> Self {
        Self {
            start: 0.0,
            position: Vector3::ZERO,
            frame: Frame::DEFAULT,
            pitch: 0.0,
            curve_radius: 0.0,
            curve_cant: 0.0,
            curve_cant_tangent: 0.0,
            accuracy: 2.0,
            adhesion_multiplier: 1.0,
            events: Vec::new(),
        }
    }
}
