//! Trackgen - compiles block-based rail routes into a continuous 3-D track.
//!
//! # Architecture
//!
//! Layered modules with strict inward-only dependencies:
//!
//! - **geometry**: Vector, quaternion, frame and chord primitives
//! - **route**: Block table, settings, stations and the structure registry
//! - **signal**: Signal table entries and their resolution into animated objects
//! - **track**: Track elements, events, follower, cant tangents, turn smoothing
//! - **synthesis**: The block walk, object placement and post-passes
//!
//! # Usage
//!
//! ```ignore
//! use trackgen::{RecordingSink, RouteData, Synthesizer};
//!
//! let mut sink = RecordingSink::new();
//! let outcome = Synthesizer::new().run(route, &mut sink)?;
//! ```

pub mod error;
pub mod geometry;
pub mod route;
pub mod signal;
pub mod synthesis;
pub mod track;

// Re-export commonly used types at crate root
pub use error::{Diagnostic, Diagnostics, Severity, SynthesisError, SynthesisResult};
pub use geometry::{Frame, Transformation, Vector2, Vector3};
pub use route::{Block, RouteData, RouteSettings};
pub use synthesis::{CompiledRoute, ObjectSink, Outcome, RecordingSink, Synthesizer};
pub use track::{Follower, Pose, Track, TrackElement, TrackEvent};
