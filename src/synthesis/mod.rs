//! The block walk.
//!
//! [`Synthesizer::run`] walks the used blocks in order with a position and
//! heading cursor. Each block becomes one [`TrackElement`](crate::track::TrackElement)
//! carrying its trigger events, and every object the block declares is
//! handed to an [`ObjectSink`]. After the walk, post-passes attach leftover
//! transponders, close stations, insert legacy safety beacons, compute cant
//! tangents and smooth turns.
//!
//! Events of a block are emitted against the element frame before the
//! block's turn. Objects are placed along the chord heading, halfway
//! through the block's arc.

mod cursor;
mod events;
mod finalize;
mod placement;
mod rails;
mod sections;
mod sink;
mod synthesizer;
mod walk;

pub use sink::{NullSink, ObjectSink, ObjectSource, Placement, RecordingSink, SinkError};
pub use synthesizer::{
    CompiledRoute, Outcome, Synthesizer, CANCEL_CHECK_INTERVAL, MIN_FINAL_RADIUS,
};
