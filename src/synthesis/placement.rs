//! Object placement along one rail of one block.

use tracing::debug;

use crate::geometry::{Transformation, Vector3};
use crate::route::{
    Block, Form, FormSecondary, PointOfInterest, Rail, SoundKind, StructureKind,
    TransponderType,
};

use super::rails::RailFrame;
use super::sink::{ObjectSource, Placement};
use super::walk::{BlockGeometry, Walk};

/// Lateral spacing between the rails a multi-rail pole spans.
const POLE_RAIL_SPACING: f64 = 3.8;
/// Poles stand where the block start is within this fraction of a pole interval.
const POLE_PHASE_TOLERANCE: f64 = 0.01;
const LIMIT_POST_OFFSET: f64 = 2.2;
const STOP_POST_OFFSET: f64 = 1.8;
/// Speeds at or above this many meters per second show the unrestricted post.
const UNRESTRICTED_SPEED: f64 = 1000.0;

fn aux(yaw: f64, pitch: f64, roll: f64) -> Transformation {
    Transformation::from_angles(yaw, pitch, roll)
}

/// Starting and ending x of a rail across a block; the ending value falls
/// back to the starting one when the next block does not carry the rail.
fn rail_span(block: &Block, next: Option<&Block>, rail: usize) -> (f64, f64) {
    if rail == 0 {
        return (0.0, 0.0);
    }
    let start = block.rail(rail).map_or(0.0, |r| r.start_x);
    let end = next
        .and_then(|b| b.rail(rail))
        .map_or(start, |r| r.end_x);
    (start, end)
}

impl Walk<'_, '_> {
    pub(super) fn place_ground(&mut self, g: &BlockGeometry) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let fallback = [0usize];
        let cycle: &[usize] = match &block.cycle {
            Some(cycle) if !cycle.is_empty() => cycle,
            _ => route
                .structures
                .cycles
                .first()
                .filter(|c| !c.is_empty())
                .map_or(&fallback, Vec::as_slice),
        };
        let ground = cycle[g.block % cycle.len()];
        let Some(handle) = route.structures.get(StructureKind::Ground, ground) else {
            debug!(ground, track_position = g.start, "ground structure not loaded");
            return;
        };
        let height = block.height.unwrap_or(0.0);
        let position = g.position - Vector3::new(0.0, height, 0.0);
        let placement = self.placement(g, position, g.ground, Transformation::IDENTITY, g.start);
        self.place(ObjectSource::Structure(handle), placement);
    }

    pub(super) fn place_ground_free_objects(&mut self, g: &BlockGeometry) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let height = block.height.unwrap_or(0.0);
        let h = g.heading;
        for object in &block.ground_free_objects {
            let d = object.track_position - g.start;
            let position = g.position
                + Vector3::new(
                    h.x * d + h.y * object.x,
                    object.y - height,
                    h.y * d - h.x * object.x,
                );
            let placement = self.placement(
                g,
                position,
                g.ground,
                aux(object.yaw, object.pitch, object.roll),
                object.track_position,
            );
            self.place_structure(StructureKind::FreeObject, object.structure, placement);
        }
    }

    /// Everything attached to rail `j`, in placement order.
    pub(super) fn place_rail_objects(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let route = self.route;
        let block = &route.blocks[g.block];

        let rail_type = block.rail_type(j);
        match route.structures.get(StructureKind::Rail, rail_type) {
            Some(handle) => {
                let placement = self.placement(
                    g,
                    rail.position,
                    rail.transform,
                    Transformation::IDENTITY,
                    g.start,
                );
                self.place(ObjectSource::Structure(handle), placement);
            }
            None => debug!(
                rail = j,
                rail_type,
                track_position = g.start,
                "rail structure not loaded"
            ),
        }

        self.collect_points_of_interest(g, j, rail);
        self.place_pole(g, j, rail);
        self.place_side_structures(g, j, rail);
        if j == 0 {
            self.place_world_sounds(g, rail);
        }
        for form in &block.forms {
            self.place_form(g, j, rail, form);
        }
        self.place_cracks(g, j, rail);
        self.place_rail_free_objects(g, j, rail);

        if j == 0 {
            self.place_transponders(g, rail);
            self.place_signals(g, rail);
            self.create_sections(g.block, g.element);
            self.place_limit_posts(g, rail);
            self.place_stop_posts(g, rail);
        }
    }

    fn collect_points_of_interest(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let next = route.blocks.get(g.block + 1);
        let interval = route.settings.block_interval;
        let here = match block.rail(j) {
            Some(rail) => *rail,
            None if j == 0 => Rail::parallel(0.0, 0.0),
            None => return,
        };
        for poi in block.points_of_interest.iter().filter(|p| p.rail == j) {
            let (dx, dy) = match next.and_then(|b| b.rail(j)) {
                Some(there) => {
                    let t = (poi.track_position - g.start) / interval;
                    (
                        here.start_x + t * (there.end_x - here.start_x),
                        here.start_y + t * (there.end_y - here.start_y),
                    )
                }
                None => (here.start_x, here.start_y),
            };
            self.points_of_interest.push(PointOfInterest {
                track_position: poi.track_position,
                offset: Vector3::new(poi.x + dx, poi.y + dy, 0.0),
                yaw: poi.yaw + rail.planar,
                pitch: poi.pitch + rail.updown,
                roll: poi.roll,
                text: poi.text.clone(),
            });
        }
    }

    fn place_pole(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let Some(pole) = self.route.blocks[g.block].poles.get(j).copied().flatten() else {
            return;
        };
        let mut dz = g.start / pole.interval;
        dz -= (dz + 0.5).floor();
        // also rejects the NaN phase of a zero interval
        if !(dz.abs() <= POLE_PHASE_TOLERANCE) {
            return;
        }

        let kind = StructureKind::Pole(pole.mode);
        let Some(handle) = self.structure(kind, pole.structure, g.start) else {
            return;
        };
        if pole.mode == 0 {
            let source = if pole.location <= 0.0 {
                ObjectSource::Structure(handle)
            } else {
                ObjectSource::Mirrored(handle)
            };
            let placement =
                self.placement(g, rail.position, rail.transform, Transformation::IDENTITY, g.start);
            self.place(source, placement);
            return;
        }

        let dx = -pole.location * POLE_RAIL_SPACING;
        let along = rail_direction(g, rail);
        let position = rail.position + g.side() * dx + along * dz;
        let placement =
            self.placement(g, position, rail.transform, Transformation::IDENTITY, g.start);
        self.place(ObjectSource::Structure(handle), placement);
    }

    fn place_side_structures(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let sides = [
            (
                block.walls.get(j).copied().flatten(),
                StructureKind::WallLeft,
                StructureKind::WallRight,
            ),
            (
                block.dikes.get(j).copied().flatten(),
                StructureKind::DikeLeft,
                StructureKind::DikeRight,
            ),
        ];
        for (side, left, right) in sides {
            let Some(side) = side else {
                continue;
            };
            let placement =
                self.placement(g, rail.position, rail.transform, Transformation::IDENTITY, g.start);
            if side.direction <= 0 {
                self.place_structure(left, side.structure, placement);
            }
            if side.direction >= 0 {
                self.place_structure(right, side.structure, placement);
            }
        }
    }

    fn place_world_sounds(&mut self, g: &BlockGeometry, rail: &RailFrame) {
        let route = self.route;
        let along = rail_direction(g, rail);
        let side = g.side();
        let up = along.cross(side);
        for sound in &route.blocks[g.block].sounds {
            let SoundKind::World { x, y } = sound.kind else {
                continue;
            };
            let Some(handle) = sound.sound else {
                continue;
            };
            let d = sound.track_position - g.start;
            let position = rail.position + side * x + up * y + along * d;
            if let Err(err) = self.sink.play_sound(handle, position) {
                self.diagnostics.error(format!(
                    "world sound failed at track position {}: {err}",
                    sound.track_position
                ));
            }
        }
    }

    fn place_form(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame, form: &Form) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let next = route.blocks.get(g.block + 1);
        let placement =
            self.placement(g, rail.position, rail.transform, Transformation::IDENTITY, g.start);
        let has_roof = form.roof_type > 0;

        if form.primary_rail == j {
            match form.secondary {
                FormSecondary::Stub => {
                    let outer = self.structure(StructureKind::FormLeft, form.form_type, g.start);
                    if let Some(handle) = outer {
                        self.place(ObjectSource::Structure(handle), placement);
                        if has_roof {
                            self.place_structure(StructureKind::RoofLeft, form.roof_type, placement);
                        }
                    }
                }
                FormSecondary::Left | FormSecondary::Right => {
                    let [outer, center, roof, roof_center] =
                        if form.secondary == FormSecondary::Left {
                            LEFT_FORM
                        } else {
                            RIGHT_FORM
                        };
                    self.place_structure(outer, form.form_type, placement);
                    self.place_structure(center, form.form_type, placement);
                    if has_roof {
                        self.place_structure(roof, form.roof_type, placement);
                        self.place_structure(roof_center, form.roof_type, placement);
                    }
                }
                // spanning to rail 0 is drawn from the secondary side only
                FormSecondary::Rail(0) => {}
                FormSecondary::Rail(s) => {
                    let started = block.rail(s).is_some_and(|r| r.started);
                    if !started {
                        self.diagnostics.error(format!(
                            "form secondary rail {s} is out of range at track position {}",
                            g.start
                        ));
                    } else {
                        let (px0, px1) = rail_span(block, next, form.primary_rail);
                        let (sx0, sx1) = rail_span(block, next, s);
                        let (near, far) = (sx0 - px0, sx1 - px1);
                        let sides = if near < 0.0 {
                            Some(LEFT_FORM)
                        } else if near > 0.0 {
                            Some(RIGHT_FORM)
                        } else {
                            None
                        };
                        if let Some([outer, center, roof, roof_center]) = sides {
                            self.place_structure(outer, form.form_type, placement);
                            self.place_stretched(center, form.form_type, near, far, placement);
                            if has_roof {
                                self.place_structure(roof, form.roof_type, placement);
                                self.place_stretched(
                                    roof_center,
                                    form.roof_type,
                                    near,
                                    far,
                                    placement,
                                );
                            }
                        }
                    }
                }
            }
        }

        // the far edge of a spanning form, drawn from the secondary rail
        if form.secondary == FormSecondary::Rail(j) {
            let px = if form.primary_rail > 0 {
                block.rail(form.primary_rail).map_or(0.0, |r| r.start_x)
            } else {
                0.0
            };
            let sx = block.rail(j).map_or(0.0, |r| r.start_x);
            let (outer, roof) = if px - sx < 0.0 {
                (StructureKind::FormLeft, StructureKind::RoofLeft)
            } else {
                (StructureKind::FormRight, StructureKind::RoofRight)
            };
            self.place_structure(outer, form.form_type, placement);
            if has_roof {
                self.place_structure(roof, form.roof_type, placement);
            }
        }
    }

    fn place_stretched(
        &mut self,
        kind: StructureKind,
        index: usize,
        near: f64,
        far: f64,
        placement: Placement,
    ) {
        if let Some(handle) = self.structure(kind, index, placement.track_position) {
            self.place(ObjectSource::Transformed { handle, near, far }, placement);
        }
    }

    fn place_cracks(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let route = self.route;
        let block = &route.blocks[g.block];
        let next = route.blocks.get(g.block + 1);
        for crack in block.cracks.iter().filter(|c| c.primary_rail == j) {
            let s = crack.secondary_rail;
            if !block.rail(s).is_some_and(|r| r.started) {
                self.diagnostics.error(format!(
                    "crack secondary rail {s} is out of range at track position {}",
                    g.start
                ));
                continue;
            }
            let (px0, px1) = rail_span(block, next, j);
            let (sx0, sx1) = rail_span(block, next, s);
            let (near, far) = (sx0 - px0, sx1 - px1);
            let kind = if near < 0.0 {
                StructureKind::CrackLeft
            } else if near > 0.0 {
                StructureKind::CrackRight
            } else {
                continue;
            };
            let placement =
                self.placement(g, rail.position, rail.transform, Transformation::IDENTITY, g.start);
            self.place_stretched(kind, crack.crack_type, near, far, placement);
        }
    }

    fn place_rail_free_objects(&mut self, g: &BlockGeometry, j: usize, rail: &RailFrame) {
        let route = self.route;
        let Some(objects) = route.blocks[g.block].rail_free_objects.get(j) else {
            return;
        };
        for object in objects {
            let local = Vector3::new(object.x, object.y, object.track_position - g.start);
            let placement = self.placement(
                g,
                rail.position + rail.transform.apply(local),
                rail.transform,
                aux(object.yaw, object.pitch, object.roll),
                object.track_position,
            );
            self.place_structure(StructureKind::FreeObject, object.structure, placement);
        }
    }

    fn place_transponders(&mut self, g: &BlockGeometry, rail: &RailFrame) {
        let route = self.route;
        let block = &route.blocks[g.block];
        for transponder in &block.transponders {
            let tpos = transponder.track_position;
            let handle = if transponder.show_default_object {
                match transponder.transponder_type {
                    TransponderType::Beacon(t) => route.compatibility.transponder(t),
                    _ => None,
                }
            } else {
                transponder
                    .beacon_structure
                    .and_then(|b| route.structures.get(StructureKind::Beacon, b))
            };
            let Some(handle) = handle else {
                debug!(track_position = tpos, "no beacon object for transponder");
                continue;
            };
            let local = Vector3::new(transponder.x, transponder.y, tpos - g.start);
            let mut placement = self.placement(
                g,
                rail.position + rail.transform.apply(local),
                rail.transform,
                aux(transponder.yaw, transponder.pitch, transponder.roll),
                tpos,
            );
            if transponder.show_default_object {
                placement.brightness = self.brightness.object_brightness(tpos);
            }
            self.place(ObjectSource::Structure(handle), placement);
        }

        for change in &block.destination_changes {
            let Some(handle) = change
                .beacon_structure
                .and_then(|b| route.structures.get(StructureKind::Beacon, b))
            else {
                continue;
            };
            let local = Vector3::new(change.x, change.y, change.track_position - g.start);
            let placement = self.placement(
                g,
                rail.position + rail.transform.apply(local),
                rail.transform,
                aux(change.yaw, change.pitch, change.roll),
                change.track_position,
            );
            self.place(ObjectSource::Structure(handle), placement);
        }
    }

    fn place_signals(&mut self, g: &BlockGeometry, rail: &RailFrame) {
        let route = self.route;
        for signal in &route.blocks[g.block].signals {
            let tpos = signal.track_position;
            let Some(data) = route.structures.signal(signal.reference) else {
                self.diagnostics.error(format!(
                    "signal {:?} is not defined, referenced at track position {tpos}",
                    signal.reference
                ));
                continue;
            };
            let dz = tpos - g.start;

            if signal.show_post {
                if let Some(post) = route.compatibility.signal_post {
                    let position =
                        rail.position + rail.transform.x * signal.x + rail.transform.z * dz;
                    let mut placement = self.placement(
                        g,
                        position,
                        rail.transform,
                        Transformation::IDENTITY,
                        tpos,
                    );
                    placement.brightness = self.brightness.object_brightness(tpos);
                    self.place(ObjectSource::Structure(post), placement);
                }
            }

            if signal.show_object {
                let Some(resolved) = data.resolve() else {
                    continue;
                };
                let local = Vector3::new(signal.x, signal.y, dz);
                let mut placement = self.placement(
                    g,
                    rail.position + rail.transform.apply(local),
                    rail.transform,
                    aux(signal.yaw, signal.pitch, signal.roll),
                    tpos,
                );
                if data.uses_ambient_brightness() {
                    placement.brightness = self.brightness.object_brightness(tpos);
                }
                let source = ObjectSource::Signal {
                    signal: resolved,
                    section: signal.section,
                };
                self.place(source, placement);
            }
        }
    }

    fn place_limit_posts(&mut self, g: &BlockGeometry, rail: &RailFrame) {
        let route = self.route;
        let objects = &route.compatibility;
        for limit in &route.blocks[g.block].limits {
            if limit.direction == 0 {
                continue;
            }
            let tpos = limit.track_position;
            let dx = LIMIT_POST_OFFSET * f64::from(limit.direction);
            let position =
                rail.position + rail.transform.x * dx + rail.transform.z * (tpos - g.start);
            let mut placement =
                self.placement(g, position, rail.transform, Transformation::IDENTITY, tpos);
            placement.brightness = self.brightness.object_brightness(tpos);

            if limit.speed <= 0.0 || limit.speed >= UNRESTRICTED_SPEED {
                if let Some(post) = objects.limit_infinite {
                    self.place(ObjectSource::Structure(post), placement);
                }
                continue;
            }
            let post = match limit.course {
                c if c < 0 => objects.limit_left,
                c if c > 0 => objects.limit_right,
                _ => objects.limit_straight,
            };
            if let Some(post) = post {
                self.place(ObjectSource::Structure(post), placement);
            }

            let digits = limit_digits(limit.speed / route.settings.unit_of_speed);
            let board = match digits.len() {
                1 => objects.limit_one_digit,
                2 => objects.limit_two_digits,
                _ => objects.limit_three_digits,
            };
            if let Some(handle) = board {
                let textures = digits.iter().map(|d| format!("limit_{d}.png")).collect();
                self.place(ObjectSource::Textured { handle, textures }, placement);
            }
        }
    }

    fn place_stop_posts(&mut self, g: &BlockGeometry, rail: &RailFrame) {
        let route = self.route;
        let Some(post) = route.compatibility.stop_post else {
            return;
        };
        for stop in &route.blocks[g.block].stops {
            if stop.direction == 0 {
                continue;
            }
            let tpos = stop.track_position;
            let dx = STOP_POST_OFFSET * f64::from(stop.direction);
            let position =
                rail.position + rail.transform.x * dx + rail.transform.z * (tpos - g.start);
            let mut placement =
                self.placement(g, position, rail.transform, Transformation::IDENTITY, tpos);
            placement.brightness = self.brightness.object_brightness(tpos);
            self.place(ObjectSource::Structure(post), placement);
        }
    }
}

const LEFT_FORM: [StructureKind; 4] = [
    StructureKind::FormLeft,
    StructureKind::FormCenterLeft,
    StructureKind::RoofLeft,
    StructureKind::RoofCenterLeft,
];

const RIGHT_FORM: [StructureKind; 4] = [
    StructureKind::FormRight,
    StructureKind::FormCenterRight,
    StructureKind::RoofRight,
    StructureKind::RoofCenterRight,
];

/// Unit vector along a diverging rail, tilted by its planar and vertical divergence.
fn rail_direction(g: &BlockGeometry, rail: &RailFrame) -> Vector3 {
    let angle = g.heading.y.atan2(g.heading.x) - rail.planar;
    Vector3::new(angle.cos(), rail.updown.tan(), angle.sin()).normalize()
}

/// Digits shown on a speed-limit board, most significant first.
fn limit_digits(limit: f64) -> Vec<u32> {
    let value = limit.round().max(0.0) as u32;
    if limit < 10.0 {
        vec![value]
    } else if limit < 100.0 {
        vec![value / 10, value % 10]
    } else {
        vec![value / 100, (value / 10) % 10, value % 10]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_digits_split_by_magnitude() {
        assert_eq!(limit_digits(4.6), vec![5]);
        assert_eq!(limit_digits(45.0), vec![4, 5]);
        assert_eq!(limit_digits(99.2), vec![9, 9]);
        assert_eq!(limit_digits(120.0), vec![1, 2, 0]);
    }

    #[test]
    fn rail_span_of_rail_zero_is_centerline() {
        let block = Block::default();
        assert_eq!(rail_span(&block, None, 0), (0.0, 0.0));
    }

    #[test]
    fn rail_span_falls_back_to_start_without_next_block() {
        let block = Block::default().with_rail(2, crate::route::Rail::parallel(4.0, 0.0));
        let mut next = block.clone();
        next.rails[2].end_x = 3.0;
        assert_eq!(rail_span(&block, None, 2), (4.0, 4.0));
        assert_eq!(rail_span(&block, Some(&next), 2), (4.0, 3.0));
    }
}
