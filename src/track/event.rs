use crate::route::{Fog, SoundHandle, SoundKind, TransponderType};

/// A trigger attached to a track element, `delta` meters after its start.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEvent {
    pub delta: f64,
    pub kind: EventKind,
}

impl TrackEvent {
    pub const fn new(delta: f64, kind: EventKind) -> Self {
        Self { delta, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    SectionChange {
        previous: Option<usize>,
        next: usize,
    },
    Transponder {
        transponder_type: TransponderType,
        data: i32,
        /// Section index, or a negative value when the beacon is unbound.
        section: i32,
        clip_to_first_red_section: bool,
    },
    BackgroundChange {
        previous: usize,
        next: usize,
    },
    /// Brightness ramp. `next` and `next_distance` are patched in when the
    /// following change is emitted; until then they repeat `current` and 0.
    BrightnessChange {
        current: f64,
        previous: f64,
        previous_distance: f64,
        next: f64,
        next_distance: f64,
    },
    FogChange {
        previous: Fog,
        current: Fog,
        next: Fog,
    },
    RailSoundsChange {
        previous_run: usize,
        previous_flange: usize,
        next_run: usize,
        next_flange: usize,
    },
    PointSound,
    StationStart {
        station: usize,
    },
    StationEnd {
        station: usize,
    },
    StationPassAlarm,
    LimitChange {
        previous: f64,
        next: f64,
    },
    MarkerStart {
        message: String,
    },
    MarkerEnd {
        message: String,
    },
    /// Sound played on the train; never [`SoundKind::World`].
    Sound {
        sound: Option<SoundHandle>,
        kind: SoundKind,
    },
    Destination {
        kind: i32,
        next_destination: i32,
        previous_destination: i32,
        trigger_once: bool,
    },
    TrackEnd,
}

impl EventKind {
    pub fn is_transponder(&self) -> bool {
        matches!(self, EventKind::Transponder { .. })
    }
}
