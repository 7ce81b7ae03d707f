//! The seam between the block walk and the host's object and sound registries.
//!
//! The walk never owns scene objects. Every placement decision is handed to an
//! [`ObjectSink`] together with the world position, the orientation bases and
//! the visibility window the host needs to instantiate it.

use crate::geometry::{Transformation, Vector3};
use crate::route::{ObjectHandle, SoundHandle};
use crate::signal::AnimatedSignal;

/// What to instantiate.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectSource {
    /// A registered structure as loaded.
    Structure(ObjectHandle),
    /// A registered structure mirrored across the track's vertical plane.
    Mirrored(ObjectHandle),
    /// A center form, roof or crack whose right edge is stretched from
    /// `near` at the block start to `far` at the block end.
    Transformed {
        handle: ObjectHandle,
        near: f64,
        far: f64,
    },
    /// A signal driven by the aspect of a section.
    Signal {
        signal: AnimatedSignal,
        section: usize,
    },
    /// A compatibility object re-textured with the given images.
    Textured {
        handle: ObjectHandle,
        textures: Vec<String>,
    },
}

/// Where and how to instantiate an object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub position: Vector3,
    /// Track-aligned basis of the rail the object belongs to.
    pub base: Transformation,
    /// Object-local yaw, pitch and roll applied on top of `base`.
    pub aux: Transformation,
    pub accurate_disposal: bool,
    /// Visibility window along the track.
    pub start_distance: f64,
    pub end_distance: f64,
    pub block_interval: f64,
    /// Track position the object is keyed to for disposal.
    pub track_position: f64,
    /// 1.0 for full brightness; compatibility objects follow the route profile.
    pub brightness: f64,
}

/// Receives every object and world sound the walk places.
///
/// Implementations are called synchronously from the walk. Errors are
/// recorded as diagnostics and never abort synthesis.
pub trait ObjectSink {
    /// Instantiate an object at the given placement.
    fn create_object(&mut self, source: ObjectSource, placement: Placement)
        -> Result<(), SinkError>;

    /// Start a looping world sound at a fixed position.
    fn play_sound(&mut self, sound: SoundHandle, position: Vector3) -> Result<(), SinkError>;
}

/// Failure reported by an [`ObjectSink`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Sink that keeps every call, for tests and offline inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub objects: Vec<(ObjectSource, Placement)>,
    pub sounds: Vec<(SoundHandle, Vector3)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placements whose source is, or is built from, `handle`.
    pub fn placements_of(&self, handle: ObjectHandle) -> impl Iterator<Item = &Placement> {
        self.objects
            .iter()
            .filter(move |(source, _)| match source {
                ObjectSource::Structure(h)
                | ObjectSource::Mirrored(h)
                | ObjectSource::Transformed { handle: h, .. }
                | ObjectSource::Textured { handle: h, .. } => *h == handle,
                ObjectSource::Signal { .. } => false,
            })
            .map(|(_, placement)| placement)
    }
}

impl ObjectSink for RecordingSink {
    fn create_object(
        &mut self,
        source: ObjectSource,
        placement: Placement,
    ) -> Result<(), SinkError> {
        self.objects.push((source, placement));
        Ok(())
    }

    fn play_sound(&mut self, sound: SoundHandle, position: Vector3) -> Result<(), SinkError> {
        self.sounds.push((sound, position));
        Ok(())
    }
}

/// Sink that discards everything, for geometry-only synthesis.
#[derive(Debug, Copy, Clone, Default)]
pub struct NullSink;

impl ObjectSink for NullSink {
    fn create_object(&mut self, _: ObjectSource, _: Placement) -> Result<(), SinkError> {
        Ok(())
    }

    fn play_sound(&mut self, _: SoundHandle, _: Vector3) -> Result<(), SinkError> {
        Ok(())
    }
}
