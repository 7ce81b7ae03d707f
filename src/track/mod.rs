//! The synthesized track and the passes that refine it.
//!
//! A [`Track`] is an ordered sequence of [`TrackElement`]s with strictly
//! increasing start positions. After the block walk it is refined by
//! [`compute_cant_tangents`] and [`smoothen_turns`]; the [`Follower`]
//! answers pose queries at arbitrary track positions.

mod cant;
mod element;
mod event;
mod follower;
mod smooth;

pub use cant::{compute_cant_tangents, MAX_TANGENT_RATIO};
pub use element::TrackElement;
pub use event::{EventKind, TrackEvent};
pub use follower::{Follower, Pose};
pub use smooth::{smoothen_turns, SmoothingReport, SEARCH_STEPS, TURN_TOLERANCE};

use crate::error::SynthesisResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    elements: Vec<TrackElement>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<TrackElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[TrackElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [TrackElement] {
        &mut self.elements
    }

    pub fn push(&mut self, element: TrackElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_elements(self) -> Vec<TrackElement> {
        self.elements
    }

    /// Index of the element containing `track_position`, or `None` before
    /// the first element.
    pub fn locate(&self, track_position: f64) -> Option<usize> {
        let first = self.elements.first()?;
        if track_position < first.start {
            return None;
        }
        let last = self.elements.len() - 1;
        if track_position >= self.elements[last].start {
            return Some(last);
        }

        // elements[lo].start <= track_position < elements[hi].start
        let mut lo = 0usize;
        let mut hi = last;
        while lo < hi - 1 {
            let mid = (lo + hi) / 2;
            if self.elements[mid].start <= track_position {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }

    pub fn pose_at(&self, track_position: f64) -> Pose {
        Follower::new().update(&self.elements, track_position)
    }

    pub fn compute_cant_tangents(&mut self) {
        compute_cant_tangents(&mut self.elements);
    }

    pub fn smoothen_turns(&mut self, subdivisions: usize) -> SynthesisResult<SmoothingReport> {
        smoothen_turns(&mut self.elements, subdivisions)
    }

    /// Event positions as absolute track positions, in element order.
    pub fn absolute_events(&self) -> impl Iterator<Item = (f64, &TrackEvent)> {
        self.elements
            .iter()
            .flat_map(|e| e.events.iter().map(move |ev| (e.start + ev.delta, ev)))
    }
}
