/// Distance at which fog starts when none is declared.
pub const NO_FOG_START: f64 = 800.0;
/// Distance at which fog saturates when none is declared.
pub const NO_FOG_END: f64 = 1600.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color24 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const GREY: Self = Self::new(128, 128, 128);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fog {
    pub start: f64,
    pub end: f64,
    pub color: Color24,
    /// Track position from which this fog applies; set during synthesis.
    pub track_position: f64,
}

impl Fog {
    pub const fn new(start: f64, end: f64, color: Color24, track_position: f64) -> Self {
        Self {
            start,
            end,
            color,
            track_position,
        }
    }

    /// The neutral fog used before any block declares one.
    pub const fn clear(track_position: f64) -> Self {
        Self::new(NO_FOG_START, NO_FOG_END, Color24::GREY, track_position)
    }

    pub fn at(self, track_position: f64) -> Self {
        Self {
            track_position,
            ..self
        }
    }
}

impl Default for Fog {
    fn default() -> Self {
        Self::clear(0.0)
    }
}

/// Fog in force where the track begins, before any fog change fires.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FogState {
    pub previous: Fog,
    pub current: Fog,
    pub next: Fog,
}

/// One declared ambient brightness value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrightnessSample {
    pub track_position: f64,
    pub value: f64,
}

impl BrightnessSample {
    pub const fn new(track_position: f64, value: f64) -> Self {
        Self {
            track_position,
            value,
        }
    }
}

/// Piecewise-linear brightness over track position.
///
/// Before the first sample brightness ramps from 1.0 at position 0; after the
/// last sample it holds the last value. Without samples it is 1.0 everywhere.
#[derive(Debug, Clone, Default)]
pub struct BrightnessProfile {
    samples: Vec<BrightnessSample>,
}

impl BrightnessProfile {
    pub fn new(mut samples: Vec<BrightnessSample>) -> Self {
        samples.sort_by(|a, b| a.track_position.total_cmp(&b.track_position));
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn at(&self, track_position: f64) -> f64 {
        if self.samples.is_empty() {
            return 1.0;
        }
        let after = self
            .samples
            .partition_point(|s| s.track_position < track_position);
        let upper = self.samples.get(after);
        let lower = self.samples[..after]
            .last()
            .or_else(|| upper.filter(|s| s.track_position == track_position));

        match (lower, upper) {
            (None, Some(max)) => {
                if max.track_position == 0.0 {
                    max.value
                } else {
                    (max.value - 1.0) * track_position / max.track_position + 1.0
                }
            }
            (Some(min), None) => min.value,
            (Some(min), Some(max)) => {
                if min.track_position == max.track_position {
                    0.5 * (min.value + max.value)
                } else {
                    let t = (track_position - min.track_position)
                        / (max.track_position - min.track_position);
                    (1.0 - t) * min.value + t * max.value
                }
            }
            (None, None) => 1.0,
        }
    }

    /// Brightness multiplier for built-in compatibility objects.
    pub fn object_brightness(&self, track_position: f64) -> f64 {
        0.25 + 0.75 * self.at(track_position)
    }
}
