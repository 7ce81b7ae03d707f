//! The block table and every route-wide table synthesis reads or fills.
//!
//! A [`RouteData`] is handed to a session by value: blocks are read in
//! order, stations gain stop records and sound origins, and the structure
//! registry is consulted for every object placement.

mod block;
mod lighting;
mod registry;
mod section;
mod settings;
mod station;

pub use block::{
    interpolate_heights, Block, Crack, DestinationChange, Form, FormSecondary, FreeObject, Limit,
    Marker, PointOfInterestDeclaration, Pole, Rail, SectionDeclaration, SideStructure,
    SignalPlacement, Sound, SoundKind, Stop, Transponder, TransponderType,
};
pub use lighting::{BrightnessProfile, BrightnessSample, Color24, Fog, FogState, NO_FOG_END, NO_FOG_START};
pub use registry::{
    CompatibilityObjects, ObjectHandle, SignalReference, SoundHandle, StructureKind,
    StructureRegistry,
};
pub use section::{Section, SectionAspect, SectionType};
pub use settings::RouteSettings;
pub use station::{
    PointOfInterest, SafetySystem, Station, StationStop, StationType, StopMode,
};

/// Everything a synthesis session consumes.
#[derive(Debug, Clone, Default)]
pub struct RouteData {
    pub settings: RouteSettings,
    pub blocks: Vec<Block>,
    /// Number of backgrounds the host has loaded.
    pub backgrounds: usize,
    pub markers: Vec<Marker>,
    pub stations: Vec<Station>,
    pub structures: StructureRegistry,
    pub compatibility: CompatibilityObjects,
}

impl RouteData {
    pub fn new(settings: RouteSettings, blocks: Vec<Block>) -> Self {
        Self {
            settings,
            blocks,
            ..Self::default()
        }
    }

    /// Brightness samples of all used blocks, in track order.
    pub fn brightness_profile(&self) -> BrightnessProfile {
        let first = self.settings.first_used_block.min(self.blocks.len());
        BrightnessProfile::new(
            self.blocks[first..]
                .iter()
                .flat_map(|b| b.brightness.iter().copied())
                .collect(),
        )
    }
}
