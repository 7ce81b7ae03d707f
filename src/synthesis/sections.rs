use crate::route::{Section, Transponder};
use crate::track::EventKind;

use super::walk::Walk;

fn transponder_event(transponder: &Transponder, section: i32) -> EventKind {
    EventKind::Transponder {
        transponder_type: transponder.transponder_type,
        data: transponder.data,
        section,
        clip_to_first_red_section: transponder.clip_to_first_red_section,
    }
}

impl Walk<'_, '_> {
    /// Appends the sections declared in block `i` and binds transponders to them.
    ///
    /// A transponder is attached to its own element exactly once: when the
    /// section it names is created, when it is walked after that section
    /// exists, or after the walk with no section.
    pub(super) fn create_sections(&mut self, i: usize, n: usize) {
        let route = self.route;
        let settings = &route.settings;
        let interval = settings.block_interval;
        let first = settings.first_used_block;
        let start = self.track.elements()[n].start;

        for declaration in &route.blocks[i].sections {
            let m = self.sections.len();
            self.attach_waiting_transponders(first, i, m, interval);

            let mut section = Section::from_aspects(
                declaration.track_position,
                &declaration.aspects,
                declaration.section_type,
                &settings.signal_speeds,
            );
            section.previous = m.checked_sub(1);
            if let Some(previous) = section.previous {
                self.sections[previous].next = Some(m);
            }
            section.station = declaration.departure_station;
            section.invisible = declaration.invisible;
            self.sections.push(section);

            let kind = EventKind::SectionChange {
                previous: m.checked_sub(1),
                next: m,
            };
            self.push_event(n, declaration.track_position - start, kind);
        }

        for (l, transponder) in route.blocks[i].transponders.iter().enumerate() {
            if self.consumed[i][l] {
                continue;
            }
            let bound = usize::try_from(transponder.section)
                .is_ok_and(|section| section < self.sections.len());
            if bound {
                let kind = transponder_event(transponder, transponder.section);
                self.push_event(n, transponder.track_position - start, kind);
                self.consumed[i][l] = true;
            }
        }
    }

    /// Attaches transponders of blocks up to `i` that wait for section `m`.
    fn attach_waiting_transponders(&mut self, first: usize, i: usize, m: usize, interval: f64) {
        let route = self.route;
        for g in first..=i {
            for (l, transponder) in route.blocks[g].transponders.iter().enumerate() {
                if self.consumed[g][l] || usize::try_from(transponder.section) != Ok(m) {
                    continue;
                }
                let delta = transponder.track_position - g as f64 * interval;
                let kind = transponder_event(transponder, transponder.section);
                self.push_event(g - first, delta, kind);
                self.consumed[g][l] = true;
            }
        }
    }

    /// Attaches every transponder not yet bound to a section.
    ///
    /// Non-negative section numbers that never came into existence become -1;
    /// negative ones are special values and pass through.
    pub(super) fn attach_unbound_transponders(&mut self) {
        let route = self.route;
        let settings = &route.settings;
        let first = settings.first_used_block;
        for i in first..route.blocks.len() {
            let n = i - first;
            let start = i as f64 * settings.block_interval;
            for (l, transponder) in route.blocks[i].transponders.iter().enumerate() {
                if self.consumed[i][l] {
                    continue;
                }
                let section = if transponder.section >= 0 {
                    -1
                } else {
                    transponder.section
                };
                let kind = transponder_event(transponder, section);
                self.push_event(n, transponder.track_position - start, kind);
                self.consumed[i][l] = true;
            }
        }
    }

    /// Adds a destination event for every destination change.
    pub(super) fn attach_destinations(&mut self) {
        let route = self.route;
        let settings = &route.settings;
        let first = settings.first_used_block;
        for i in first..route.blocks.len() {
            let start = i as f64 * settings.block_interval;
            for change in &route.blocks[i].destination_changes {
                let kind = EventKind::Destination {
                    kind: change.kind,
                    next_destination: change.next_destination,
                    previous_destination: change.previous_destination,
                    trigger_once: change.trigger_once,
                };
                self.push_event(i - first, change.track_position - start, kind);
            }
        }
    }
}
