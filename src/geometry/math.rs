use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Horizontal heading in the ground plane.
///
/// `x` maps to world X and `y` maps to world Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 1.0);

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the unit vector, or the vector unchanged when it has no length.
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        Self::new(self.x / mag, self.y / mag)
    }

    /// Counter-clockwise rotation given precomputed cosine and sine.
    pub fn rotate(self, cos: f64, sin: f64) -> Self {
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn rotate_by(self, angle: f64) -> Self {
        self.rotate(angle.cos(), angle.sin())
    }

    /// Yaw angle measured from +Z towards +X.
    pub fn yaw(self) -> f64 {
        self.x.atan2(self.y)
    }

    /// Unit vector perpendicular to the heading, pointing to its right.
    pub fn side(self) -> Vector3 {
        Vector3::new(self.y, 0.0, -self.x)
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Self::FORWARD
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    /// Direction vector for a ground heading climbing at the given gradient.
    pub fn from_heading(heading: Vector2, gradient: f64) -> Self {
        Self::new(heading.x, gradient, heading.y).normalize()
    }

    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Squared length of the projection onto the ground plane.
    pub fn horizontal_squared(self) -> f64 {
        self.x * self.x + self.z * self.z
    }

    pub fn horizontal_magnitude(self) -> f64 {
        self.horizontal_squared().sqrt()
    }

    /// Returns the unit vector, or the vector unchanged when it has no length.
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        self * (1.0 / mag)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Rotates the ground-plane components like [`Vector2::rotate`], keeping `y`.
    pub fn rotate_plane(self, cos: f64, sin: f64) -> Self {
        Self::new(self.x * cos - self.z * sin, self.y, self.x * sin + self.z * cos)
    }

    pub fn rotate_around(self, axis: Self, angle: f64) -> Self {
        Quaternion::from_axis_angle(axis, angle).mul_vec(self)
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Unit quaternion for 3D rotations.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let half_angle = angle * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        let normalized = axis.normalize();

        Self::new(normalized.x * s, normalized.y * s, normalized.z * s, c)
    }

    pub fn mul_vec(self, v: Vector3) -> Vector3 {
        let qv = Vector3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * (2.0 * self.w)) + (uuv * 2.0)
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sign of a value as used by the route geometry: zero maps to zero.
pub fn signum(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn heading_rotation_matches_plane_rotation() {
        let heading = Vector2::new(0.3, 0.8).normalize();
        let angle = -0.41;
        let rotated = heading.rotate_by(angle);
        let lifted = Vector3::new(heading.x, 2.0, heading.y).rotate_plane(angle.cos(), angle.sin());

        assert_relative_eq!(rotated.x, lifted.x, epsilon = TOLERANCE);
        assert_relative_eq!(rotated.y, lifted.z, epsilon = TOLERANCE);
        assert_relative_eq!(lifted.y, 2.0, epsilon = TOLERANCE);
    }

    #[test]
    fn negative_heading_rotation_equals_rotation_about_up() {
        let heading = Vector2::new(0.6, 0.8);
        let a = 0.25;
        let planar = heading.rotate_by(-a);
        let spatial = Vector3::new(heading.x, 0.0, heading.y).rotate_around(Vector3::UP, a);

        assert_relative_eq!(planar.x, spatial.x, epsilon = TOLERANCE);
        assert_relative_eq!(planar.y, spatial.z, epsilon = TOLERANCE);
    }

    #[test]
    fn quaternion_quarter_turn_about_up() {
        let rotated = Vector3::RIGHT.rotate_around(Vector3::UP, FRAC_PI_2);

        assert_relative_eq!(rotated.x, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(rotated.y, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(rotated.z, -1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn side_points_right_of_heading() {
        let side = Vector2::FORWARD.side();
        assert_eq!(side, Vector3::RIGHT);
    }

    #[test]
    fn normalize_leaves_zero_untouched() {
        assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    }

    #[test]
    fn from_heading_climbs_with_gradient() {
        let dir = Vector3::from_heading(Vector2::FORWARD, 0.1);
        assert_relative_eq!(dir.magnitude(), 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(dir.y / dir.z, 0.1, epsilon = TOLERANCE);
    }
}
