use serde::{Deserialize, Serialize};

use crate::error::{SynthesisError, SynthesisResult};

/// Route-wide scalars that steer synthesis.
///
/// Every field has a default, so a settings file only lists what it changes:
///
/// ```toml
/// block_interval = 25.0
/// signed_cant = true
/// signal_speeds = [0.0, 6.94, 15.28, 20.83, 25.0]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Length of one block in meters.
    pub block_interval: f64,
    /// Passed through to object placement as the disposal policy.
    pub accurate_object_disposal: bool,
    /// Meters per second per displayed speed unit, used for limit digits.
    pub unit_of_speed: f64,
    pub first_used_block: usize,
    /// When false, cant magnitude is taken as absolute and signed by the curve direction.
    pub signed_cant: bool,
    /// Fog interpolates from each declared change instead of jumping per block.
    pub fog_transition_mode: bool,
    /// Speed per aspect number, in meters per second.
    pub signal_speeds: Vec<f64>,
    /// Emit compatibility ATC/ATS transponders at station boundaries and limits.
    pub safety_system_beacons: bool,
    /// Run the turn smoother when the block interval allows subdivision.
    pub smooth_turns: bool,
}

impl RouteSettings {
    pub fn from_toml_str(source: &str) -> SynthesisResult<Self> {
        let settings: Self =
            toml::from_str(source).map_err(|e| SynthesisError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SynthesisResult<()> {
        if !self.block_interval.is_finite() || self.block_interval <= 0.0 {
            return Err(SynthesisError::InvalidBlockInterval(self.block_interval));
        }
        if !self.unit_of_speed.is_finite() || self.unit_of_speed <= 0.0 {
            return Err(SynthesisError::Config(format!(
                "unit_of_speed must be positive, got {}",
                self.unit_of_speed
            )));
        }
        Ok(())
    }

    /// Number of smoothing samples per block: one every 5 meters.
    pub fn subdivisions(&self) -> usize {
        (self.block_interval / 5.0).floor().max(0.0) as usize
    }

    /// Applies the cant sign convention to a declared cant.
    pub fn effective_cant(&self, radius: f64, cant: f64) -> f64 {
        let sign = crate::geometry::signum(radius);
        if self.signed_cant {
            if radius != 0.0 {
                cant * sign
            } else {
                cant
            }
        } else {
            cant.abs() * sign
        }
    }

    pub const DEFAULT: Self = Self {
        block_interval: 25.0,
        accurate_object_disposal: false,
        unit_of_speed: 1.0,
        first_used_block: 0,
        signed_cant: false,
        fog_transition_mode: false,
        signal_speeds: Vec::new(),
        safety_system_beacons: true,
        smooth_turns: true,
    };
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}
