//! Pure geometric primitives for track synthesis.
//!
//! Vectors, orientation frames, placement bases and the per-block chord kernel.
//! Nothing here knows about blocks, events or registries.

mod chord;
mod frame;
mod math;
mod transform;

pub use chord::Chord;
pub(crate) use chord::arc_chord;
pub use frame::Frame;
pub use math::{signum, Quaternion, Vector2, Vector3};
pub use transform::Transformation;
