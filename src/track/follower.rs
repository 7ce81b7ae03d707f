use crate::geometry::{arc_chord, signum, Frame, Vector3};

use super::element::TrackElement;

/// Interpolated state of the track at an arbitrary track position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    /// Index of the element the position falls in.
    pub element: usize,
    pub position: Vector3,
    pub frame: Frame,
    pub curve_radius: f64,
    pub curve_cant: f64,
    pub pitch: f64,
    pub adhesion_multiplier: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            element: 0,
            position: Vector3::ZERO,
            frame: Frame::DEFAULT,
            curve_radius: 0.0,
            curve_cant: 0.0,
            pitch: 0.0,
            adhesion_multiplier: 1.0,
        }
    }
}

/// Walks an element sequence, remembering the last element it stood on.
///
/// The follower holds no borrow of the elements: each [`Follower::update`]
/// reads the slice it is given, so callers can mutate the track between
/// queries and the next query sees the new state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Follower {
    index: usize,
}

impl Follower {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    /// Pose at `track_position`. Positions before the first element
    /// extrapolate from it; an empty slice yields the default pose.
    pub fn update(&mut self, elements: &[TrackElement], track_position: f64) -> Pose {
        if elements.is_empty() {
            return Pose::default();
        }
        let mut i = self.index.min(elements.len() - 1);
        while track_position < elements[i].start {
            if i == 0 {
                break;
            }
            i -= 1;
        }
        while i + 1 < elements.len() && track_position >= elements[i + 1].start {
            i += 1;
        }
        self.index = i;

        let element = &elements[i];
        let next = elements.get(i + 1);
        let db = track_position - element.start;
        let mut pose = Pose {
            element: i,
            position: element.position,
            frame: element.frame,
            curve_radius: element.curve_radius,
            curve_cant: element.curve_cant,
            pitch: element.pitch,
            adhesion_multiplier: element.adhesion_multiplier,
        };
        if db == 0.0 {
            return pose;
        }

        if element.curve_radius != 0.0 {
            let r = element.curve_radius;
            let dir = element.frame.direction;
            let p = dir.y / dir.horizontal_magnitude();
            let s = db / (1.0 + p * p).sqrt();
            let h = s * p;
            let b = s / r.abs();
            let c = signum(db) * arc_chord(r, b);
            let a = 0.5 * signum(r) * b;

            let mut d = Vector3::new(dir.x, 0.0, dir.z)
                .normalize()
                .rotate_around(Vector3::UP, a);
            pose.position = element.position + d * c + Vector3::new(0.0, h, 0.0);
            d = d.rotate_around(Vector3::UP, a);
            let direction = Vector3::new(d.x, p, d.z).normalize();
            let side = element.frame.side.rotate_around(Vector3::UP, 2.0 * a);
            pose.frame = Frame::new(direction, direction.cross(side), side);
        } else {
            pose.position = element.position + element.frame.direction * db;
        }

        if let Some(next) = next {
            let t = (db / (next.start - element.start)).clamp(0.0, 1.0);
            pose.curve_cant = hermite(
                t,
                element.curve_cant,
                element.curve_cant_tangent,
                next.curve_cant,
                next.curve_cant_tangent,
            );
        }
        pose
    }
}

/// Cubic Hermite interpolation on the unit interval.
fn hermite(t: f64, p0: f64, m0: f64, p1: f64, m1: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * t3 - 3.0 * t2 + 1.0) * p0
        + (t3 - 2.0 * t2 + t) * m0
        + (-2.0 * t3 + 3.0 * t2) * p1
        + (t3 - t2) * m1
}
