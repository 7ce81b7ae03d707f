use crate::geometry::Vector3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StopMode {
    #[default]
    AllStop,
    AllPass,
    PlayerStop,
    PlayerPass,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StationType {
    #[default]
    Normal,
    ChangeEnds,
    Terminal,
}

/// Train protection system in force at a station.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SafetySystem {
    #[default]
    Any,
    Ats,
    Atc,
}

/// A stop point registered against a station during synthesis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StationStop {
    pub track_position: f64,
    pub forward_tolerance: f64,
    pub backward_tolerance: f64,
    pub cars: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Station {
    pub name: String,
    pub open_left_doors: bool,
    pub open_right_doors: bool,
    pub stop_mode: StopMode,
    pub station_type: StationType,
    pub safety_system: SafetySystem,
    pub default_track_position: f64,
    /// World position announcements are played from; written by synthesis.
    pub sound_origin: Vector3,
    pub stops: Vec<StationStop>,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Lateral offset towards the platform side: left only, right only, or centered.
    pub fn door_side_offset(&self, magnitude: f64) -> f64 {
        match (self.open_left_doors, self.open_right_doors) {
            (true, false) => -magnitude,
            (false, true) => magnitude,
            _ => 0.0,
        }
    }
}

/// Camera bookmark along the track.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub track_position: f64,
    /// Offset in the local track basis: lateral, vertical, forward.
    pub offset: Vector3,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub text: String,
}
