use crate::error::Diagnostics;
use crate::geometry::{Chord, Frame, Transformation, Vector2, Vector3};
use crate::route::{
    BrightnessProfile, FogState, ObjectHandle, PointOfInterest, RouteData, Section, Station, StructureKind,
};
use crate::track::{EventKind, Track, TrackElement};

use super::cursor::{Cursor, EventRef};
use super::rails::resolve_rail;
use super::sink::{ObjectSink, ObjectSource, Placement};

/// Geometry of the block being walked, fixed once the turn and the first
/// half of the arc have been applied.
#[derive(Debug, Copy, Clone)]
pub(super) struct BlockGeometry {
    pub block: usize,
    pub element: usize,
    pub start: f64,
    pub end: f64,
    /// Rail 0 at the block start.
    pub position: Vector3,
    /// Chord heading, halfway through the arc.
    pub heading: Vector2,
    pub chord: Chord,
    pub ground: Transformation,
    pub track: Transformation,
}

impl BlockGeometry {
    /// Lateral unit vector of the chord heading.
    pub fn side(&self) -> Vector3 {
        self.heading.side()
    }
}

/// One pass over the block table and everything it accumulates.
pub(super) struct Walk<'r, 's> {
    pub route: &'r RouteData,
    pub sink: &'s mut dyn ObjectSink,
    pub brightness: BrightnessProfile,
    pub cursor: Cursor,
    pub track: Track,
    pub sections: Vec<Section>,
    pub stations: Vec<Station>,
    pub points_of_interest: Vec<PointOfInterest>,
    pub diagnostics: Diagnostics,
    /// Set by the first fog the walk publishes.
    pub initial_fog: Option<FogState>,
    /// Per block and transponder: already attached to an element.
    pub consumed: Vec<Vec<bool>>,
}

impl<'r, 's> Walk<'r, 's> {
    pub fn new(route: &'r RouteData, sink: &'s mut dyn ObjectSink) -> Self {
        let settings = &route.settings;
        Self {
            route,
            sink,
            brightness: route.brightness_profile(),
            cursor: Cursor::new(
                &route.blocks,
                settings.first_used_block,
                settings.block_interval,
            ),
            track: Track::new(),
            sections: Vec::new(),
            stations: route.stations.clone(),
            points_of_interest: Vec::new(),
            diagnostics: Diagnostics::new(),
            initial_fog: None,
            consumed: route
                .blocks
                .iter()
                .map(|b| vec![false; b.transponders.len()])
                .collect(),
        }
    }

    /// Emits the element, events and objects of block `i`, then advances the cursor.
    pub fn walk_block(&mut self, i: usize) {
        let route = self.route;
        let settings = &route.settings;
        let interval = settings.block_interval;
        let block = &route.blocks[i];
        let start = i as f64 * interval;

        self.cursor.heading = self.cursor.heading.normalize();
        let mut element = TrackElement::new(
            start,
            self.cursor.position,
            Frame::from_heading(self.cursor.heading, block.pitch),
        );
        element.pitch = block.pitch;
        element.curve_radius = block.curve_radius;
        element.curve_cant = settings.effective_cant(block.curve_radius, block.curve_cant);
        element.accuracy = block.accuracy;
        element.adhesion_multiplier = block.adhesion_multiplier;
        let n = self.track.push(element);

        self.emit_block_events(i, n);

        if block.turn != 0.0 {
            let (cos, sin) = self.cursor.turn(block.turn);
            let element = &mut self.track.elements_mut()[n];
            element.frame = element.frame.rotate_plane(cos, sin);
        }

        let chord = Chord::for_block(interval, block.pitch, block.curve_radius);
        self.cursor.sweep_half(&chord);
        let heading = self.cursor.heading;
        let yaw = heading.yaw();
        let pitch = block.pitch.atan();
        let geometry = BlockGeometry {
            block: i,
            element: n,
            start,
            end: start + interval,
            position: self.cursor.position,
            heading,
            chord,
            ground: Transformation::from_angles(yaw, 0.0, 0.0),
            track: Transformation::from_angles(yaw, pitch, 0.0),
        };

        self.place_ground(&geometry);
        self.place_ground_free_objects(&geometry);
        // rail 0 is the cursor path and exists whether or not the block lists it
        let frame = resolve_rail(&route.blocks, 0, &geometry, interval);
        self.place_rail_objects(&geometry, 0, &frame);
        for (j, rail) in block.rails.iter().enumerate().skip(1) {
            if !rail.started {
                continue;
            }
            let frame = resolve_rail(&route.blocks, j, &geometry, interval);
            self.place_rail_objects(&geometry, j, &frame);
        }

        self.cursor.advance(&chord);
    }

    pub fn push_event(&mut self, element: usize, delta: f64, kind: EventKind) -> EventRef {
        let event = self.track.elements_mut()[element].push_event(delta, kind);
        EventRef { element, event }
    }

    pub fn event_mut(&mut self, at: EventRef) -> &mut EventKind {
        &mut self.track.elements_mut()[at.element].events[at.event].kind
    }

    /// Looks up a structure, recording an error when it was never loaded.
    pub fn structure(
        &mut self,
        kind: StructureKind,
        index: usize,
        track_position: f64,
    ) -> Option<ObjectHandle> {
        let handle = self.route.structures.get(kind, index);
        if handle.is_none() {
            self.diagnostics.error(format!(
                "{kind} structure {index} is not loaded, referenced at track position {track_position}"
            ));
        }
        handle
    }

    /// Placement in the visibility window of the current block.
    pub fn placement(
        &self,
        geometry: &BlockGeometry,
        position: Vector3,
        base: Transformation,
        aux: Transformation,
        track_position: f64,
    ) -> Placement {
        let settings = &self.route.settings;
        Placement {
            position,
            base,
            aux,
            accurate_disposal: settings.accurate_object_disposal,
            start_distance: geometry.start,
            end_distance: geometry.end,
            block_interval: settings.block_interval,
            track_position,
            brightness: 1.0,
        }
    }

    pub fn place(&mut self, source: ObjectSource, placement: Placement) {
        let track_position = placement.track_position;
        if let Err(err) = self.sink.create_object(source, placement) {
            self.diagnostics.error(format!(
                "object placement failed at track position {track_position}: {err}"
            ));
        }
    }

    /// Places a registered structure unchanged, if it was loaded.
    pub fn place_structure(&mut self, kind: StructureKind, index: usize, placement: Placement) {
        if let Some(handle) = self.structure(kind, index, placement.track_position) {
            self.place(ObjectSource::Structure(handle), placement);
        }
    }
}
