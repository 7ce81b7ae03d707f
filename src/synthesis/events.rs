use crate::geometry::signum;
use crate::route::{FogState, SoundKind, StationStop};
use crate::track::EventKind;

use super::walk::Walk;

/// Offset of the point sound from the start of its element.
pub(super) const POINT_SOUND_OFFSET: f64 = 12.5;

/// Blocks between the pass alarm and the station it warns about.
const PASS_ALARM_LEAD: usize = 6;

impl Walk<'_, '_> {
    /// Emits the trigger events of block `i` onto element `n`, in track order
    /// of their kinds. All positions use the frame before the block's turn.
    pub(super) fn emit_block_events(&mut self, i: usize, n: usize) {
        self.emit_background(i, n);
        self.emit_brightness(i, n);
        self.emit_fog(i, n);
        self.emit_rail_sounds(i, n);
        self.emit_point_sound(i, n);
        self.emit_station(i, n);
        self.emit_stops(i, n);
        self.emit_limits(i, n);
        self.emit_markers(i, n);
        self.emit_train_sounds(i, n);
    }

    fn element_start(&self, n: usize) -> f64 {
        self.track.elements()[n].start
    }

    fn emit_background(&mut self, i: usize, n: usize) {
        let route = self.route;
        let Some(next) = route.blocks[i].background else {
            return;
        };
        let first = route.settings.first_used_block;
        let previous = if i == first {
            Some(next)
        } else {
            route.blocks[first..i]
                .iter()
                .rev()
                .find_map(|b| b.background)
                .or((route.backgrounds > 0).then_some(0))
        };
        if let Some(previous) = previous {
            if previous < route.backgrounds && next < route.backgrounds {
                self.push_event(n, 0.0, EventKind::BackgroundChange { previous, next });
            }
        }
    }

    fn emit_brightness(&mut self, i: usize, n: usize) {
        let route = self.route;
        let start = self.element_start(n);
        for sample in &route.blocks[i].brightness {
            let carry = self.cursor.brightness;
            let gap = sample.track_position - carry.track_position;
            let at = self.push_event(
                n,
                sample.track_position - start,
                EventKind::BrightnessChange {
                    current: sample.value,
                    previous: carry.value,
                    previous_distance: gap,
                    next: sample.value,
                    next_distance: 0.0,
                },
            );
            if let Some(last) = carry.last_event {
                if let EventKind::BrightnessChange {
                    next,
                    next_distance,
                    ..
                } = self.event_mut(last)
                {
                    *next = sample.value;
                    *next_distance = gap;
                }
            }
            self.cursor.brightness.value = sample.value;
            self.cursor.brightness.track_position = sample.track_position;
            self.cursor.brightness.last_event = Some(at);
        }
    }

    fn emit_fog(&mut self, i: usize, n: usize) {
        let route = self.route;
        let block = &route.blocks[i];
        let start = self.element_start(n);
        let interval = route.settings.block_interval;
        let mut fog = block.fog;

        if route.settings.fog_transition_mode {
            if !block.fog_defined {
                return;
            }
            if i == 0 && start == 0.0 {
                self.cursor.fog.previous = fog;
            }
            fog.track_position = start;
            let previous = self.cursor.fog.previous;
            let at = self.push_event(
                n,
                0.0,
                EventKind::FogChange {
                    previous,
                    current: fog,
                    next: fog,
                },
            );
            match self.cursor.fog.last_event {
                Some(last) => {
                    if let EventKind::FogChange { next, .. } = self.event_mut(last) {
                        *next = fog;
                    }
                }
                None => {
                    self.initial_fog = Some(FogState {
                        previous,
                        current: previous,
                        next: fog,
                    });
                }
            }
            self.cursor.fog.previous = fog;
            self.cursor.fog.last_event = Some(at);
        } else if i == 0 && start == 0.0 {
            self.cursor.fog.current = fog;
            self.cursor.fog.previous = fog;
            self.initial_fog = Some(FogState {
                previous: fog,
                current: fog,
                next: fog,
            });
        } else {
            fog.track_position = start + interval;
            let carry = self.cursor.fog;
            self.push_event(
                n,
                0.0,
                EventKind::FogChange {
                    previous: carry.previous,
                    current: carry.current,
                    next: fog,
                },
            );
            self.cursor.fog.previous = carry.current;
            self.cursor.fog.current = fog;
        }
    }

    fn emit_rail_sounds(&mut self, i: usize, n: usize) {
        let route = self.route;
        let (run, flange) = route.structures.rail_sounds(route.blocks[i].rail_type(0));
        let kind = EventKind::RailSoundsChange {
            previous_run: self.cursor.run_sound,
            previous_flange: self.cursor.flange_sound,
            next_run: run,
            next_flange: flange,
        };
        self.push_event(n, 0.0, kind);
        self.cursor.run_sound = run;
        self.cursor.flange_sound = flange;
    }

    /// A point sound plays where a started rail crosses rail 0 towards the next block.
    fn emit_point_sound(&mut self, i: usize, n: usize) {
        let route = self.route;
        let blocks = &route.blocks;
        let Some(next) = blocks.get(i + 1) else {
            return;
        };
        let crosses = blocks[i]
            .rails
            .iter()
            .zip(&next.rails)
            .any(|(rail, next_rail)| {
                rail.started
                    && signum(rail.start_x) != signum(next_rail.end_x)
                    && rail.start_y * next_rail.end_y <= 0.0
            });
        if crosses {
            self.push_event(n, POINT_SOUND_OFFSET, EventKind::PointSound);
        }
    }

    fn emit_station(&mut self, i: usize, n: usize) {
        let route = self.route;
        let block = &route.blocks[i];
        let Some(station) = block.station else {
            return;
        };
        let start = self.element_start(n);
        if station >= self.stations.len() {
            self.diagnostics.error(format!(
                "station {station} is not defined, referenced at track position {start}"
            ));
            return;
        }

        self.push_event(n, 0.0, EventKind::StationStart { station });
        let frame = self.track.elements()[n].frame;
        let dx = self.stations[station].door_side_offset(5.0);
        self.stations[station].sound_origin =
            self.track.elements()[n].position + frame.side * dx + frame.up * 3.0;

        let first = route.settings.first_used_block;
        if block.station_pass_alarm && i >= first + PASS_ALARM_LEAD {
            self.push_event(i - PASS_ALARM_LEAD - first, 0.0, EventKind::StationPassAlarm);
        }
    }

    fn emit_stops(&mut self, i: usize, n: usize) {
        let route = self.route;
        let element = &self.track.elements()[n];
        let (origin, frame) = (element.position, element.frame);
        for stop in &route.blocks[i].stops {
            let Some(station) = self.stations.get_mut(stop.station) else {
                self.diagnostics.error(format!(
                    "station {} is not defined, referenced by a stop at track position {}",
                    stop.station, stop.track_position
                ));
                continue;
            };
            station.stops.push(StationStop {
                track_position: stop.track_position,
                forward_tolerance: stop.forward_tolerance,
                backward_tolerance: stop.backward_tolerance,
                cars: stop.cars,
            });
            let dx = station.door_side_offset(5.0);
            station.sound_origin = origin + frame.side * dx + frame.up * 2.0;
        }
    }

    fn emit_limits(&mut self, i: usize, n: usize) {
        let route = self.route;
        let start = self.element_start(n);
        for limit in &route.blocks[i].limits {
            let kind = EventKind::LimitChange {
                previous: self.cursor.speed_limit,
                next: limit.speed,
            };
            self.push_event(n, limit.track_position - start, kind);
            self.cursor.speed_limit = limit.speed;
        }
    }

    /// Marker messages whose start or end falls in this block.
    fn emit_markers(&mut self, _i: usize, n: usize) {
        let route = self.route;
        let start = self.element_start(n);
        let end = start + route.settings.block_interval;
        let within = |p: f64| p >= start && p < end;
        for marker in &route.markers {
            let Some(message) = &marker.message else {
                continue;
            };
            if within(marker.start) {
                let kind = EventKind::MarkerStart {
                    message: message.clone(),
                };
                self.push_event(n, marker.start - start, kind);
            }
            if within(marker.end) {
                let kind = EventKind::MarkerEnd {
                    message: message.clone(),
                };
                self.push_event(n, marker.end - start, kind);
            }
        }
    }

    /// Train-bound sounds become events; world sounds are placed with the rails.
    fn emit_train_sounds(&mut self, i: usize, n: usize) {
        let route = self.route;
        let start = self.element_start(n);
        for sound in &route.blocks[i].sounds {
            if matches!(sound.kind, SoundKind::World { .. }) {
                continue;
            }
            let kind = EventKind::Sound {
                sound: sound.sound,
                kind: sound.kind,
            };
            self.push_event(n, sound.track_position - start, kind);
        }
    }
}
