use crate::error::{SynthesisError, SynthesisResult};
use crate::geometry::Vector3;

use super::element::TrackElement;
use super::follower::{Follower, Pose};

/// Squared horizontal direction change at a boundary that counts as a turn.
pub const TURN_TOLERANCE: f64 = 1e-4;
/// Steps of the longitudinal search that shortens a corrected element.
pub const SEARCH_STEPS: usize = 1000;

const BOUNDARY_BLEND: f64 = 0.00000001;
const AXIS_GATE: f64 = 0.000001;
const PITCH_GATE: f64 = 0.00000001;

/// What a smoothing pass changed.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SmoothingReport {
    pub turns_corrected: usize,
    /// Track length removed by shortening corrected elements.
    pub total_shortage: f64,
}

/// Subdivides the track and replaces undeclared heading kinks by arcs.
///
/// Original elements end up at multiples of `subdivisions`; the elements in
/// between are sampled from the old track and carry no events. Kinks whose
/// radius cannot be estimated are left in place.
pub fn smoothen_turns(
    elements: &mut Vec<TrackElement>,
    subdivisions: usize,
) -> SynthesisResult<SmoothingReport> {
    if subdivisions < 2 {
        return Err(SynthesisError::InvalidSubdivisions(subdivisions));
    }
    if elements.len() < 2 {
        return Ok(SmoothingReport::default());
    }

    subdivide(elements, subdivisions);
    let turns = find_turns(elements, subdivisions);

    let mut report = SmoothingReport::default();
    for i in turns {
        let Some(radius) = estimate_radius(&elements[i - 1], &elements[i + 1]) else {
            continue;
        };
        report.total_shortage += correct_turn(elements, i, radius);
        report.turns_corrected += 1;
    }

    rehome_events(elements);
    tracing::debug!(
        turns = report.turns_corrected,
        shortage = report.total_shortage,
        "smoothed turns"
    );
    Ok(report)
}

fn subdivide(elements: &mut Vec<TrackElement>, subdivisions: usize) {
    let old = std::mem::take(elements);
    let mut follower = Follower::new();
    let mut samples = Vec::with_capacity((old.len() - 1) * (subdivisions - 1));
    for pair in old.windows(2) {
        for m in 1..subdivisions {
            let r = m as f64 / subdivisions as f64;
            let p = (1.0 - r) * pair[0].start + r * pair[1].start;
            samples.push((p, follower.update(&old, p)));
        }
    }

    let mut samples = samples.into_iter();
    let last = old.len() - 1;
    elements.reserve(last * subdivisions + 1);
    for (q, original) in old.into_iter().enumerate() {
        let template = TrackElement {
            events: Vec::new(),
            curve_cant_tangent: 0.0,
            ..original.clone()
        };
        elements.push(original);
        if q == last {
            break;
        }
        for (p, pose) in samples.by_ref().take(subdivisions - 1) {
            elements.push(TrackElement {
                start: p,
                position: pose.position,
                frame: pose.frame,
                curve_cant: pose.curve_cant,
                ..template.clone()
            });
        }
    }
}

/// Boundaries of original elements where the heading jumps.
fn find_turns(elements: &[TrackElement], subdivisions: usize) -> Vec<usize> {
    let mut follower = Follower::new();
    (1..elements.len() - 1)
        .filter(|i| i % subdivisions == 0)
        .filter(|&i| {
            let p = just_before(elements[i - 1].start, elements[i].start);
            let before = follower.update(elements, p).frame.direction;
            let d = elements[i].frame.direction - before;
            d.horizontal_squared() > TURN_TOLERANCE
        })
        .collect()
}

/// Radius of the arc through both neighbours, if both ground axes agree.
fn estimate_radius(a: &TrackElement, b: &TrackElement) -> Option<f64> {
    let s = a.frame.side - b.frame.side;
    let d = b.position - a.position;
    let rx = if s.x * s.x > AXIS_GATE { d.x / s.x } else { 0.0 };
    let rz = if s.z * s.z > AXIS_GATE { d.z / s.z } else { 0.0 };

    let r = match (rx != 0.0, rz != 0.0) {
        (false, false) => return None,
        (true, false) => rx,
        (false, true) => rz,
        (true, true) => {
            let f = rx / rz;
            if rx.signum() == rz.signum() && f.abs() > 0.9 && f.abs() < 1.1 {
                (rx * rz).abs().sqrt() * rx.signum()
            } else {
                0.0
            }
        }
    };
    (r * r > 1.0).then_some(r)
}

/// Bends the kink at `i` into an arc and returns the track length removed.
fn correct_turn(elements: &mut [TrackElement], i: usize, radius: f64) -> f64 {
    let mut follower = Follower::new();
    let mut shortage = 0.0;

    elements[i - 1].curve_radius = radius;
    let p = just_before(elements[i - 1].start, elements[i].start);
    let pose = follower.update(elements, p);
    elements[i].curve_radius = radius;
    elements[i].position = pose.position;
    elements[i].frame = pose.frame;

    shortage += shorten(elements, i, &mut follower);

    let reached = pose_before_next(elements, i, &mut follower);
    let target = elements[i + 1].position;
    let sa = (reached.position - elements[i].position).horizontal_magnitude();
    let sb = (target - elements[i].position).horizontal_magnitude();
    let sc = (target - reached.position).horizontal_magnitude();
    let denominator = 2.0 * sa * sb;
    if denominator != 0.0 {
        let angle = ((sa * sa + sb * sb - sc * sc) / denominator)
            .clamp(-1.0, 1.0)
            .acos();
        let original = elements[i].frame;
        let mut best = (f64::MAX, 0.0);
        for j in [-1.0, 0.0, 1.0] {
            elements[i].frame = original.rotate_around(Vector3::UP, j * angle);
            let gap = gap_to_next(elements, i, &mut follower);
            if gap < best.0 {
                best = (gap, j);
            }
        }
        elements[i].frame = original.rotate_around(Vector3::UP, best.1 * angle);
        shortage += shorten(elements, i, &mut follower);
    }

    let reached = pose_before_next(elements, i, &mut follower);
    let a1 = slope(elements[i + 1].position - elements[i].position);
    let a2 = slope(reached.position - elements[i].position);
    let b = a2 - a1;
    if b * b > PITCH_GATE {
        elements[i].frame = elements[i].frame.pitch_around_side(b);
    }
    shortage
}

/// Pulls every element after `i` back until element `i` ends closest to its
/// successor. Stops at the first step that does not improve.
fn shorten(elements: &mut [TrackElement], i: usize, follower: &mut Follower) -> f64 {
    let target = elements[i + 1].position;
    let end = elements[i + 1].start;
    let step = (end - elements[i].start) / SEARCH_STEPS as f64;

    let mut best = gap_to_next(elements, i, follower);
    let mut best_step = 0;
    for j in 1..SEARCH_STEPS - 1 {
        let pose = follower.update(elements, end - j as f64 * step);
        let gap = (target - pose.position).magnitude_squared();
        if gap < best {
            best = gap;
            best_step = j;
        } else {
            break;
        }
    }

    let s = best_step as f64 * step;
    for element in &mut elements[i + 1..] {
        element.start -= s;
    }
    s
}

fn pose_before_next(elements: &[TrackElement], i: usize, follower: &mut Follower) -> Pose {
    let p = just_before(elements[i].start, elements[i + 1].start);
    follower.update(elements, p)
}

fn gap_to_next(elements: &[TrackElement], i: usize, follower: &mut Follower) -> f64 {
    let reached = pose_before_next(elements, i, follower);
    (elements[i + 1].position - reached.position).magnitude_squared()
}

/// A position a hair before `to`, coming from `from`.
fn just_before(from: f64, to: f64) -> f64 {
    BOUNDARY_BLEND * from + (1.0 - BOUNDARY_BLEND) * to
}

fn slope(d: Vector3) -> f64 {
    (d.y / d.horizontal_magnitude()).atan()
}

/// Moves events that now lie past their element's end onto the next element.
fn rehome_events(elements: &mut [TrackElement]) {
    for i in 0..elements.len().saturating_sub(1) {
        let start = elements[i].start;
        let end = elements[i + 1].start;
        let (stay, moved): (Vec<_>, Vec<_>) = std::mem::take(&mut elements[i].events)
            .into_iter()
            .partition(|e| start + e.delta < end);
        elements[i].events = stay;
        for mut event in moved {
            event.delta += start - end;
            elements[i + 1].events.push(event);
        }
    }
}
