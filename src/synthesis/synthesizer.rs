use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::{Diagnostics, SynthesisError, SynthesisResult};
use crate::route::{interpolate_heights, FogState, PointOfInterest, RouteData, Section, Station};
use crate::track::{SmoothingReport, Track};

use super::finalize;
use super::sink::ObjectSink;
use super::walk::Walk;

/// Blocks walked between cancellation checks; must be a power of two.
pub const CANCEL_CHECK_INTERVAL: usize = 16;

/// Last-block radii below this are straightened, so every left curve is too.
pub const MIN_FINAL_RADIUS: f64 = 300.0;

/// Everything a completed session produces besides the placed objects.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub track: Track,
    pub sections: Vec<Section>,
    pub stations: Vec<Station>,
    pub points_of_interest: Vec<PointOfInterest>,
    pub diagnostics: Diagnostics,
    /// Fog at the start of the track; `None` when no block declared one there.
    pub initial_fog: Option<FogState>,
    /// `None` when turn smoothing did not run.
    pub smoothing: Option<SmoothingReport>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(CompiledRoute),
    /// The cancel flag was raised; partial output was discarded.
    Cancelled,
}

impl Outcome {
    pub fn completed(self) -> Option<CompiledRoute> {
        match self {
            Outcome::Completed(route) => Some(route),
            Outcome::Cancelled => None,
        }
    }
}

/// Runs the block walk and its post-passes.
///
/// The cancel flag is polled every [`CANCEL_CHECK_INTERVAL`] blocks, where the
/// walk also yields its thread. Progress is reported as the fraction of used
/// blocks walked, then 1.0 once the post-passes finish.
#[derive(Default)]
pub struct Synthesizer<'a> {
    cancel: Option<&'a AtomicBool>,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
}

impl<'a> Synthesizer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, progress: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn report(&mut self, fraction: f64) {
        if let Some(progress) = self.progress.as_mut() {
            progress(fraction);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn run(
        &mut self,
        mut route: RouteData,
        sink: &mut dyn ObjectSink,
    ) -> SynthesisResult<Outcome> {
        route.settings.validate()?;
        let len = route.blocks.len();
        if len == 0 {
            return Err(SynthesisError::EmptyBlockTable);
        }
        let first = route.settings.first_used_block;
        if first >= len {
            return Err(SynthesisError::FirstBlockOutOfRange { first, len });
        }

        interpolate_heights(&mut route.blocks);
        if let Some(last) = route.blocks.last_mut() {
            if last.curve_radius < MIN_FINAL_RADIUS {
                last.curve_radius = 0.0;
            }
        }

        info!(blocks = len - first, first, "synthesizing track");
        let mut walk = Walk::new(&route, sink);
        for i in first..len {
            self.report((i - first) as f64 / (len - first) as f64);
            if i & (CANCEL_CHECK_INTERVAL - 1) == 0 {
                std::thread::yield_now();
                if self.cancelled() {
                    info!(block = i, "synthesis cancelled");
                    return Ok(Outcome::Cancelled);
                }
            }
            walk.walk_block(i);
        }

        let mut compiled = walk.finish();
        compiled.track.compute_cant_tangents();
        let subdivisions = route.settings.subdivisions();
        if route.settings.smooth_turns && subdivisions >= 2 {
            let report = compiled.track.smoothen_turns(subdivisions)?;
            compiled.track.compute_cant_tangents();
            compiled.smoothing = Some(report);
        }

        self.report(1.0);
        info!(
            elements = compiled.track.len(),
            sections = compiled.sections.len(),
            diagnostics = compiled.diagnostics.len(),
            "track synthesized"
        );
        Ok(Outcome::Completed(compiled))
    }
}

impl Walk<'_, '_> {
    /// Runs the post-walk passes that need the whole track.
    pub(super) fn finish(mut self) -> CompiledRoute {
        self.attach_unbound_transponders();
        self.attach_destinations();

        let settings = &self.route.settings;
        let interval = settings.block_interval;
        let elements = self.track.elements_mut();
        finalize::insert_station_ends(
            elements,
            &self.stations,
            interval,
            settings.first_used_block,
        );
        if self.points_of_interest.is_empty() {
            self.points_of_interest = finalize::default_points_of_interest(&self.stations);
        }
        finalize::convert_block_cant(elements);
        finalize::validate_stations(&mut self.stations, &mut self.diagnostics);
        finalize::insert_track_end(elements, interval);
        if settings.safety_system_beacons {
            finalize::insert_safety_beacons(elements, &self.stations);
        }
        debug!(
            points_of_interest = self.points_of_interest.len(),
            stations = self.stations.len(),
            "post-walk passes done"
        );

        CompiledRoute {
            track: self.track,
            sections: self.sections,
            stations: self.stations,
            points_of_interest: self.points_of_interest,
            diagnostics: self.diagnostics,
            initial_fog: self.initial_fog,
            smoothing: None,
        }
    }
}
