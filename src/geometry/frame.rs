use super::math::{Vector2, Vector3};

/// Orthonormal orientation of the track at a point.
///
/// - `direction`: forward along the track
/// - `up`: track normal, `direction × side`
/// - `side`: to the right of the direction, always horizontal when built from a heading
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub direction: Vector3,
    pub up: Vector3,
    pub side: Vector3,
}

impl Frame {
    pub const fn new(direction: Vector3, up: Vector3, side: Vector3) -> Self {
        Self {
            direction,
            up,
            side,
        }
    }

    /// Frame for a ground heading climbing at `gradient` (rise over run).
    pub fn from_heading(heading: Vector2, gradient: f64) -> Self {
        let direction = Vector3::from_heading(heading, gradient);
        let side = heading.side();
        Self::new(direction, direction.cross(side), side)
    }

    /// Applies a ground-plane rotation to direction and side, then rebuilds up.
    pub fn rotate_plane(self, cos: f64, sin: f64) -> Self {
        let direction = self.direction.rotate_plane(cos, sin);
        let side = self.side.rotate_plane(cos, sin);
        Self::new(direction, direction.cross(side), side)
    }

    /// Rotates all three axes around an arbitrary axis by `angle` radians.
    pub fn rotate_around(self, axis: Vector3, angle: f64) -> Self {
        Self {
            direction: self.direction.rotate_around(axis, angle),
            up: self.up.rotate_around(axis, angle),
            side: self.side.rotate_around(axis, angle),
        }
    }

    /// Tilts direction and up around the side axis, leaving side untouched.
    pub fn pitch_around_side(self, angle: f64) -> Self {
        Self {
            direction: self.direction.rotate_around(self.side, angle),
            up: self.up.rotate_around(self.side, angle),
            side: self.side,
        }
    }

    pub fn yaw(self) -> f64 {
        self.direction.x.atan2(self.direction.z)
    }

    pub fn pitch(self) -> f64 {
        self.direction.y.atan2(self.direction.horizontal_magnitude())
    }

    pub const DEFAULT: Self = Self::new(Vector3::FORWARD, Vector3::UP, Vector3::RIGHT);
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const TOLERANCE: f64 = 1e-12;

    fn assert_orthonormal(frame: Frame) {
        assert_relative_eq!(frame.direction.magnitude(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.up.magnitude(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.side.magnitude(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.direction.dot(frame.up), 0.0, epsilon = 1e-9);
        assert_relative_eq!(frame.direction.dot(frame.side), 0.0, epsilon = 1e-9);
        assert_relative_eq!(frame.up.dot(frame.side), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn default_frame_matches_forward_heading() {
        let frame = Frame::from_heading(Vector2::FORWARD, 0.0);
        assert_eq!(frame, Frame::DEFAULT);
    }

    #[test]
    fn heading_frame_is_orthonormal_when_climbing() {
        let frame = Frame::from_heading(Vector2::new(0.6, 0.8), 0.04);
        assert_orthonormal(frame);
        assert!(frame.up.y > 0.0);
        assert_relative_eq!(frame.side.y, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn rotate_around_up_by_negative_quarter_turn() {
        let rotated = Frame::DEFAULT.rotate_around(Vector3::UP, -FRAC_PI_2);

        assert_relative_eq!(rotated.direction.x, -1.0, epsilon = TOLERANCE);
        assert_relative_eq!(rotated.direction.z, 0.0, epsilon = TOLERANCE);
        assert_orthonormal(rotated);
    }

    #[test]
    fn plane_rotation_keeps_frame_orthonormal() {
        let frame = Frame::from_heading(Vector2::FORWARD, 0.02);
        let angle: f64 = -0.3;
        let rotated = frame.rotate_plane(angle.cos(), angle.sin());

        assert_orthonormal(rotated);
        assert_relative_eq!(rotated.pitch(), frame.pitch(), epsilon = TOLERANCE);
    }

    #[test]
    fn pitch_around_side_changes_only_pitch() {
        let frame = Frame::from_heading(Vector2::new(0.6, 0.8), 0.0);
        let tilted = frame.pitch_around_side(0.01);

        assert_relative_eq!(tilted.pitch().abs(), 0.01, epsilon = 1e-9);
        assert_relative_eq!(tilted.yaw(), frame.yaw(), epsilon = 1e-9);
        assert_orthonormal(tilted);
    }
}
