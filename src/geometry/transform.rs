use super::math::Vector3;

/// Local basis handed to object placement: `x` lateral, `y` up, `z` forward.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transformation {
    pub x: Vector3,
    pub y: Vector3,
    pub z: Vector3,
}

impl Transformation {
    pub const fn new(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self { x, y, z }
    }

    pub const IDENTITY: Self = Self::new(Vector3::RIGHT, Vector3::UP, Vector3::FORWARD);

    /// Basis turned by `yaw` about up, then `pitch` about the new lateral axis
    /// (positive raises the nose), then `roll` about the new forward axis.
    pub fn from_angles(yaw: f64, pitch: f64, roll: f64) -> Self {
        if yaw == 0.0 && pitch == 0.0 && roll == 0.0 {
            return Self::IDENTITY;
        }
        if pitch == 0.0 && roll == 0.0 {
            let (sin, cos) = yaw.sin_cos();
            return Self::new(
                Vector3::new(cos, 0.0, -sin),
                Vector3::UP,
                Vector3::new(sin, 0.0, cos),
            );
        }
        Self::IDENTITY.rotated(yaw, pitch, -roll)
    }

    /// Applies yaw, pitch, and roll relative to this basis.
    pub fn rotated(self, yaw: f64, pitch: f64, roll: f64) -> Self {
        let Self {
            x: mut side,
            y: mut up,
            z: mut dir,
        } = self;
        side = side.rotate_around(up, yaw);
        dir = dir.rotate_around(up, yaw);
        up = up.rotate_around(side, -pitch);
        dir = dir.rotate_around(side, -pitch);
        side = side.rotate_around(dir, roll);
        up = up.rotate_around(dir, roll);
        Self::new(side, up, dir)
    }

    /// Basis whose forward axis points along `forward`, with a horizontal lateral axis.
    pub fn looking_along(forward: Vector3) -> Self {
        let z = forward.normalize();
        let x = Vector3::new(z.z, 0.0, -z.x).normalize();
        Self::new(x, z.cross(x), z)
    }

    /// Maps local coordinates into world space.
    pub fn apply(self, local: Vector3) -> Vector3 {
        self.x * local.x + self.y * local.y + self.z * local.z
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}
