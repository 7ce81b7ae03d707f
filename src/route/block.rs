use super::lighting::{BrightnessSample, Fog};
use super::registry::{SignalReference, SoundHandle};
use super::section::SectionType;

/// Lateral and vertical offsets of one rail relative to rail 0.
///
/// `start_*` apply at the start of the block, `end_*` describe where the rail
/// arrives at the start of this block when coming from the previous one.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rail {
    pub started: bool,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Rail {
    /// A rail running parallel to rail 0 at a fixed offset.
    pub const fn parallel(x: f64, y: f64) -> Self {
        Self {
            started: true,
            start_x: x,
            start_y: y,
            end_x: x,
            end_y: y,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pole {
    /// Number of rails the pole spans; mode 0 is a single-rail pole.
    pub mode: usize,
    /// Negative for left, positive for right.
    pub location: f64,
    /// Placement interval in meters.
    pub interval: f64,
    pub structure: usize,
}

/// Wall or dike along a rail; `direction` < 0 left, > 0 right, 0 both.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SideStructure {
    pub direction: i32,
    pub structure: usize,
}

/// What a platform form is bounded by on its far side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormSecondary {
    /// The form ends without connecting to another rail.
    Stub,
    Left,
    Right,
    /// The form spans to the given rail.
    Rail(usize),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Form {
    pub primary_rail: usize,
    pub secondary: FormSecondary,
    pub form_type: usize,
    /// Roof structure index; 0 means no roof.
    pub roof_type: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Crack {
    pub primary_rail: usize,
    pub secondary_rail: usize,
    pub crack_type: usize,
}

/// Object placed at an explicit offset from the track.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FreeObject {
    pub track_position: f64,
    pub structure: usize,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransponderType {
    /// A route beacon of the given numeric type.
    Beacon(i32),
    AtcTrackStatus,
    AtcSpeedLimit,
    AtsPTemporarySpeedLimit,
    /// Temporary limit declared by the route, later packed into [`TransponderType::AtsPTemporarySpeedLimit`].
    InternalAtsPTemporarySpeedLimit,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transponder {
    pub track_position: f64,
    pub transponder_type: TransponderType,
    pub data: i32,
    /// Section the beacon reports on; negative values are passed through verbatim.
    pub section: i32,
    pub clip_to_first_red_section: bool,
    pub show_default_object: bool,
    pub beacon_structure: Option<usize>,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DestinationChange {
    pub track_position: f64,
    pub beacon_structure: Option<usize>,
    pub kind: i32,
    pub next_destination: i32,
    pub previous_destination: i32,
    pub trigger_once: bool,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SignalPlacement {
    pub track_position: f64,
    pub reference: SignalReference,
    /// Section whose aspect drives the signal.
    pub section: usize,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub show_object: bool,
    pub show_post: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionDeclaration {
    pub track_position: f64,
    pub aspects: Vec<i32>,
    pub section_type: SectionType,
    pub departure_station: Option<usize>,
    pub invisible: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Limit {
    pub track_position: f64,
    /// Meters per second; non-positive or very large values mean unrestricted.
    pub speed: f64,
    /// Side of the post: -1 left, 1 right, 0 no post.
    pub direction: i32,
    /// Curve arrow on the post: -1 left, 1 right, 0 straight.
    pub course: i32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stop {
    pub track_position: f64,
    pub station: usize,
    /// Side of the stop post: -1 left, 1 right, 0 no post.
    pub direction: i32,
    pub forward_tolerance: f64,
    pub backward_tolerance: f64,
    pub cars: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SoundKind {
    /// Played in the world at an offset from rail 0.
    World { x: f64, y: f64 },
    /// Played once on the player train when it passes.
    TrainStatic,
    /// Played on passing trains with pitch tied to `speed`.
    TrainDynamic { speed: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sound {
    pub track_position: f64,
    pub sound: Option<SoundHandle>,
    pub kind: SoundKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterestDeclaration {
    pub track_position: f64,
    pub rail: usize,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub text: String,
}

/// Route data for one block interval, as produced by the route parser.
///
/// Per-rail vectors (`rails`, `rail_types`, `poles`, `walls`, `dikes`,
/// `rail_free_objects`) are indexed by rail number.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub background: Option<usize>,
    pub brightness: Vec<BrightnessSample>,
    pub fog: Fog,
    pub fog_defined: bool,
    /// Ground structure cycle; `None` inherits the registry's first cycle.
    pub cycle: Option<Vec<usize>>,
    /// Ground height below rail 0; undefined heights are interpolated.
    pub height: Option<f64>,
    pub curve_radius: f64,
    pub curve_cant: f64,
    pub pitch: f64,
    /// Declared heading change as a ratio (tangent of the angle).
    pub turn: f64,
    pub accuracy: f64,
    pub adhesion_multiplier: f64,
    pub rails: Vec<Rail>,
    pub rail_types: Vec<usize>,
    pub station: Option<usize>,
    pub station_pass_alarm: bool,
    pub stops: Vec<Stop>,
    pub limits: Vec<Limit>,
    pub sounds: Vec<Sound>,
    pub ground_free_objects: Vec<FreeObject>,
    pub rail_free_objects: Vec<Vec<FreeObject>>,
    pub poles: Vec<Option<Pole>>,
    pub walls: Vec<Option<SideStructure>>,
    pub dikes: Vec<Option<SideStructure>>,
    pub forms: Vec<Form>,
    pub cracks: Vec<Crack>,
    pub transponders: Vec<Transponder>,
    pub destination_changes: Vec<DestinationChange>,
    pub signals: Vec<SignalPlacement>,
    pub sections: Vec<SectionDeclaration>,
    pub points_of_interest: Vec<PointOfInterestDeclaration>,
}

impl Block {
    pub fn rail(&self, index: usize) -> Option<&Rail> {
        self.rails.get(index)
    }

    pub fn rail_type(&self, index: usize) -> usize {
        self.rail_types.get(index).copied().unwrap_or(0)
    }

    pub fn with_curve(mut self, radius: f64, cant: f64) -> Self {
        self.curve_radius = radius;
        self.curve_cant = cant;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_turn(mut self, turn: f64) -> Self {
        self.turn = turn;
        self
    }

    pub fn with_rail(mut self, index: usize, rail: Rail) -> Self {
        if self.rails.len() <= index {
            self.rails.resize(index + 1, Rail::default());
        }
        self.rails[index] = rail;
        self
    }
}

impl Default for Block {
    fn default() -> Self {
        Self {
            background: None,
            brightness: Vec::new(),
            fog: Fog::default(),
            fog_defined: false,
            cycle: None,
            height: None,
            curve_radius: 0.0,
            curve_cant: 0.0,
            pitch: 0.0,
            turn: 0.0,
            accuracy: 2.0,
            adhesion_multiplier: 1.0,
            rails: vec![Rail {
                started: true,
                ..Rail::default()
            }],
            rail_types: vec![0],
            station: None,
            station_pass_alarm: false,
            stops: Vec::new(),
            limits: Vec::new(),
            sounds: Vec::new(),
            ground_free_objects: Vec::new(),
            rail_free_objects: Vec::new(),
            poles: Vec::new(),
            walls: Vec::new(),
            dikes: Vec::new(),
            forms: Vec::new(),
            cracks: Vec::new(),
            transponders: Vec::new(),
            destination_changes: Vec::new(),
            signals: Vec::new(),
            sections: Vec::new(),
            points_of_interest: Vec::new(),
        }
    }
}

/// A message shown while the train is between two track positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub start: f64,
    pub end: f64,
    pub message: Option<String>,
}

/// Fills undefined block heights.
///
/// Gaps between two defined heights are interpolated linearly, trailing
/// blocks copy the last defined height and leading blocks stay at 0.
pub fn interpolate_heights(blocks: &mut [Block]) {
    let mut last_defined: Option<usize> = None;
    for i in 0..blocks.len() {
        let Some(b) = blocks[i].height else {
            continue;
        };
        if let Some(j) = last_defined {
            if let Some(a) = blocks[j].height {
                let step = (b - a) / (i - j) as f64;
                let mut h = a;
                for block in &mut blocks[j + 1..i] {
                    h += step;
                    block.height = Some(h);
                }
            }
        }
        last_defined = Some(i);
    }
    if let Some(z) = last_defined {
        let h = blocks[z].height;
        for block in &mut blocks[z + 1..] {
            block.height = h;
        }
    }
}
