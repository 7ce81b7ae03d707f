use super::math::signum;

/// Straight-line advance across one block.
///
/// `length` is the horizontal chord, `rise` the vertical gain and
/// `half_angle` half the heading change swept by the block's arc.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Chord {
    pub length: f64,
    pub rise: f64,
    pub half_angle: f64,
}

impl Chord {
    pub const fn new(length: f64, rise: f64, half_angle: f64) -> Self {
        Self {
            length,
            rise,
            half_angle,
        }
    }

    /// Chord of a block `interval` long with gradient `pitch` on a curve of `radius`.
    ///
    /// Zero radius means straight track. Positive radii curve to the right.
    pub fn for_block(interval: f64, pitch: f64, radius: f64) -> Self {
        if radius != 0.0 && pitch != 0.0 {
            let s = interval / (1.0 + pitch * pitch).sqrt();
            let b = s / radius.abs();
            Self::new(arc_chord(radius, b), s * pitch, 0.5 * signum(radius) * b)
        } else if radius != 0.0 {
            let b = interval / radius.abs();
            Self::new(arc_chord(radius, b), 0.0, 0.5 * signum(radius) * b)
        } else if pitch != 0.0 {
            let c = interval / (1.0 + pitch * pitch).sqrt();
            Self::new(c, c * pitch, 0.0)
        } else {
            Self::new(interval, 0.0, 0.0)
        }
    }

    /// Heading change swept by the arc only; the declared turn is separate.
    pub fn sweep_half_angle(interval: f64, pitch: f64, radius: f64) -> f64 {
        if radius == 0.0 {
            return 0.0;
        }
        let s = if pitch != 0.0 {
            interval / (1.0 + pitch * pitch).sqrt()
        } else {
            interval
        };
        0.5 * signum(radius) * s / radius.abs()
    }

    /// Distance between the chord end points.
    pub fn distance(self) -> f64 {
        (self.length * self.length + self.rise * self.rise).sqrt()
    }
}

/// Chord of an arc subtending `angle` on a circle of `radius`.
pub(crate) fn arc_chord(radius: f64, angle: f64) -> f64 {
    let f = 2.0 * radius * radius * (1.0 - angle.cos());
    f.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f64 = 1e-10;

    #[test]
    fn straight_level_block_is_full_interval() {
        let chord = Chord::for_block(25.0, 0.0, 0.0);
        assert_eq!(chord, Chord::new(25.0, 0.0, 0.0));
    }

    #[test]
    fn curved_block_matches_closed_form() {
        let chord = Chord::for_block(25.0, 0.0, 500.0);
        let expected = (2.0 * 500.0f64 * 500.0 * (1.0 - 0.05f64.cos())).sqrt();

        assert_relative_eq!(chord.length, expected, epsilon = TOLERANCE);
        assert_relative_eq!(chord.half_angle, 0.025, epsilon = TOLERANCE);
        assert_eq!(chord.rise, 0.0);
    }

    #[test]
    fn left_curve_has_negative_half_angle() {
        let chord = Chord::for_block(25.0, 0.0, -500.0);
        assert_relative_eq!(chord.half_angle, -0.025, epsilon = TOLERANCE);
    }

    #[test]
    fn graded_block_splits_interval_into_run_and_rise() {
        let chord = Chord::for_block(25.0, 0.01, 0.0);
        assert_relative_eq!(chord.distance(), 25.0, epsilon = TOLERANCE);
        assert_relative_eq!(chord.rise / chord.length, 0.01, epsilon = TOLERANCE);
    }

    #[test]
    fn graded_curve_uses_horizontal_arc_length() {
        let pitch = 0.02;
        let chord = Chord::for_block(25.0, pitch, 600.0);
        let s = 25.0 / (1.0 + pitch * pitch).sqrt();

        assert_relative_eq!(chord.rise, s * pitch, epsilon = TOLERANCE);
        assert_relative_eq!(chord.half_angle, 0.5 * s / 600.0, epsilon = TOLERANCE);
        assert_relative_eq!(
            chord.half_angle,
            Chord::sweep_half_angle(25.0, pitch, 600.0),
            epsilon = TOLERANCE
        );
        assert!(chord.length < s);
    }
}
