use std::collections::HashMap;
use std::fmt;

use crate::signal::SignalData;

/// Opaque reference to an object loaded by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

/// Opaque reference to a sound buffer loaded by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// Structure tables a block can refer to by index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Rail,
    Ground,
    /// Poles are keyed by their rail-count mode.
    Pole(usize),
    WallLeft,
    WallRight,
    DikeLeft,
    DikeRight,
    FormLeft,
    FormRight,
    FormCenterLeft,
    FormCenterRight,
    RoofLeft,
    RoofRight,
    RoofCenterLeft,
    RoofCenterRight,
    CrackLeft,
    CrackRight,
    FreeObject,
    Beacon,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureKind::Rail => write!(f, "Rail"),
            StructureKind::Ground => write!(f, "Ground"),
            StructureKind::Pole(mode) => write!(f, "Pole (mode {})", mode),
            StructureKind::WallLeft => write!(f, "WallL"),
            StructureKind::WallRight => write!(f, "WallR"),
            StructureKind::DikeLeft => write!(f, "DikeL"),
            StructureKind::DikeRight => write!(f, "DikeR"),
            StructureKind::FormLeft => write!(f, "FormL"),
            StructureKind::FormRight => write!(f, "FormR"),
            StructureKind::FormCenterLeft => write!(f, "FormCL"),
            StructureKind::FormCenterRight => write!(f, "FormCR"),
            StructureKind::RoofLeft => write!(f, "RoofL"),
            StructureKind::RoofRight => write!(f, "RoofR"),
            StructureKind::RoofCenterLeft => write!(f, "RoofCL"),
            StructureKind::RoofCenterRight => write!(f, "RoofCR"),
            StructureKind::CrackLeft => write!(f, "CrackL"),
            StructureKind::CrackRight => write!(f, "CrackR"),
            StructureKind::FreeObject => write!(f, "FreeObj"),
            StructureKind::Beacon => write!(f, "Beacon"),
        }
    }
}

/// Index-addressed structure, sound and signal tables for one route.
///
/// Populated by the host after loading objects; synthesis only reads it.
#[derive(Debug, Clone, Default)]
pub struct StructureRegistry {
    objects: HashMap<(StructureKind, usize), ObjectHandle>,
    /// Ground structure cycles, referenced by a block's cycle index.
    pub cycles: Vec<Vec<usize>>,
    /// Run sound index per rail type.
    pub run_sounds: Vec<usize>,
    /// Flange sound index per rail type.
    pub flange_sounds: Vec<usize>,
    pub signals: Vec<SignalData>,
    pub compatibility_signals: Vec<SignalData>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: StructureKind, index: usize, handle: ObjectHandle) {
        self.objects.insert((kind, index), handle);
    }

    pub fn with(mut self, kind: StructureKind, index: usize, handle: ObjectHandle) -> Self {
        self.register(kind, index, handle);
        self
    }

    pub fn get(&self, kind: StructureKind, index: usize) -> Option<ObjectHandle> {
        self.objects.get(&(kind, index)).copied()
    }

    pub fn contains(&self, kind: StructureKind, index: usize) -> bool {
        self.objects.contains_key(&(kind, index))
    }

    /// Run and flange sound indices for a rail type, 0 when unmapped.
    pub fn rail_sounds(&self, rail_type: usize) -> (usize, usize) {
        (
            self.run_sounds.get(rail_type).copied().unwrap_or(0),
            self.flange_sounds.get(rail_type).copied().unwrap_or(0),
        )
    }

    pub fn signal(&self, reference: SignalReference) -> Option<&SignalData> {
        match reference {
            SignalReference::Object(i) => self.signals.get(i),
            SignalReference::Compatibility(i) => self.compatibility_signals.get(i),
        }
    }
}

/// Which signal table a placed signal refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignalReference {
    Object(usize),
    Compatibility(usize),
}

/// Built-in objects used for posts and default beacons.
///
/// Any handle left `None` is silently not placed.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityObjects {
    pub signal_post: Option<ObjectHandle>,
    pub limit_straight: Option<ObjectHandle>,
    pub limit_left: Option<ObjectHandle>,
    pub limit_right: Option<ObjectHandle>,
    pub limit_infinite: Option<ObjectHandle>,
    pub limit_one_digit: Option<ObjectHandle>,
    pub limit_two_digits: Option<ObjectHandle>,
    pub limit_three_digits: Option<ObjectHandle>,
    pub stop_post: Option<ObjectHandle>,
    /// Default beacon objects indexed by beacon type 0 to 4.
    pub transponders: [Option<ObjectHandle>; 5],
}

impl CompatibilityObjects {
    pub fn transponder(&self, beacon_type: i32) -> Option<ObjectHandle> {
        usize::try_from(beacon_type)
            .ok()
            .and_then(|i| self.transponders.get(i).copied().flatten())
    }
}
