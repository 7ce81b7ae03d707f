//! End-to-end synthesis sessions against small hand-built routes.

use std::cell::RefCell;
use std::sync::atomic::AtomicBool;

use approx::assert_relative_eq;

use trackgen::route::{
    Color24, Fog, FogState, FreeObject, ObjectHandle, Pole, SectionDeclaration, SectionType,
    Station, Stop, StopMode, StructureKind, Transponder, TransponderType,
};
use trackgen::synthesis::NullSink;
use trackgen::track::EventKind;
use trackgen::{
    Block, CompiledRoute, Outcome, RecordingSink, RouteData, RouteSettings, SynthesisError,
    Synthesizer,
};

const TOLERANCE: f64 = 1e-9;

fn settings() -> RouteSettings {
    RouteSettings {
        smooth_turns: false,
        safety_system_beacons: false,
        ..RouteSettings::default()
    }
}

fn compile(route: RouteData) -> CompiledRoute {
    let outcome = Synthesizer::new()
        .run(route, &mut NullSink)
        .expect("synthesis should succeed");
    outcome.completed().expect("synthesis should not be cancelled")
}

fn straight(blocks: usize) -> RouteData {
    RouteData::new(settings(), vec![Block::default(); blocks])
}

fn events(route: &CompiledRoute, element: usize) -> Vec<&EventKind> {
    route.track.elements()[element]
        .events
        .iter()
        .map(|e| &e.kind)
        .collect()
}

fn transponder(track_position: f64, section: i32) -> Transponder {
    Transponder {
        track_position,
        transponder_type: TransponderType::Beacon(7),
        data: 1,
        section,
        clip_to_first_red_section: false,
        show_default_object: false,
        beacon_structure: None,
        x: 0.0,
        y: 0.0,
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    }
}

fn section(track_position: f64) -> SectionDeclaration {
    SectionDeclaration {
        track_position,
        aspects: vec![0, 2],
        section_type: SectionType::IndexBased,
        departure_station: None,
        invisible: false,
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn single_straight_block() {
    let compiled = compile(straight(1));
    let elements = compiled.track.elements();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].start, 0.0);
    assert_relative_eq!(elements[0].frame.direction.z, 1.0, epsilon = TOLERANCE);
    assert_relative_eq!(elements[0].frame.direction.x, 0.0, epsilon = TOLERANCE);
    assert!(matches!(
        elements[0].events.last().map(|e| &e.kind),
        Some(EventKind::TrackEnd)
    ));
}

#[test]
fn straight_blocks_advance_by_interval() {
    let compiled = compile(straight(3));
    let elements = compiled.track.elements();
    for (k, element) in elements.iter().enumerate() {
        assert_relative_eq!(element.position.z, 25.0 * k as f64, epsilon = TOLERANCE);
        assert_relative_eq!(element.position.x, 0.0, epsilon = TOLERANCE);
    }
}

#[test]
fn curve_chord_matches_arc() {
    let mut route = straight(3);
    route.blocks[0] = Block::default().with_curve(500.0, 0.0);
    let compiled = compile(route);
    let p = compiled.track.elements()[1].position;

    let chord = (2.0 * 500.0_f64.powi(2) * (1.0 - 0.05_f64.cos())).sqrt();
    assert_relative_eq!(p.horizontal_magnitude(), chord, epsilon = TOLERANCE);
    // half the arc is swept before moving along the chord
    assert_relative_eq!(p.x, chord * 0.025_f64.sin(), epsilon = TOLERANCE);
    assert!(p.x > 0.0, "positive radius curves towards +X");

    let direction = compiled.track.elements()[1].frame.direction;
    assert_relative_eq!(direction.x.atan2(direction.z), 0.05, epsilon = TOLERANCE);
}

#[test]
fn chord_distance_covers_every_radius_and_pitch_combination() {
    for (radius, pitch) in [(0.0, 0.0), (0.0, 0.02), (400.0, 0.0), (-400.0, 0.02)] {
        let mut route = straight(2);
        route.blocks[0] = Block::default().with_curve(radius, 0.0).with_pitch(pitch);
        let compiled = compile(route);
        let moved = compiled.track.elements()[1].position - compiled.track.elements()[0].position;

        let s = 25.0 / (1.0 + pitch * pitch).sqrt();
        let horizontal = if radius == 0.0 {
            s
        } else {
            let b = s / radius.abs();
            (2.0 * radius * radius * (1.0 - b.cos())).sqrt()
        };
        let expected = (horizontal * horizontal + (s * pitch).powi(2)).sqrt();
        assert_relative_eq!(moved.magnitude(), expected, epsilon = 1e-9);
    }
}

#[test]
fn declared_turn_rotates_heading() {
    let mut route = straight(3);
    route.blocks[0] = Block::default().with_turn(0.1);
    let compiled = compile(route);
    let angle = 0.1_f64.atan();

    for element in &compiled.track.elements()[..2] {
        let d = element.frame.direction;
        assert_relative_eq!(d.x.atan2(d.z), angle, epsilon = TOLERANCE);
    }
    let p = compiled.track.elements()[1].position;
    assert_relative_eq!(p.x, 25.0 * angle.sin(), epsilon = TOLERANCE);
    assert_relative_eq!(p.z, 25.0 * angle.cos(), epsilon = TOLERANCE);
}

#[test]
fn tight_final_curve_is_straightened() {
    let mut route = straight(2);
    route.blocks[1] = Block::default().with_curve(200.0, 0.1);
    let compiled = compile(route);
    assert_eq!(compiled.track.elements()[1].curve_radius, 0.0);
}

#[test]
fn final_left_curve_is_straightened_at_any_radius() {
    for radius in [-200.0, -1000.0] {
        let mut route = straight(2);
        route.blocks[1] = Block::default().with_curve(radius, 0.0);
        let compiled = compile(route);
        assert_eq!(compiled.track.elements()[1].curve_radius, 0.0);
    }

    let mut route = straight(2);
    route.blocks[1] = Block::default().with_curve(1000.0, 0.0);
    let compiled = compile(route);
    assert_eq!(compiled.track.elements()[1].curve_radius, 1000.0);
}

#[test]
fn cant_tangents_are_bounded() {
    let mut blocks = vec![Block::default(); 12];
    for (k, block) in blocks.iter_mut().enumerate() {
        let cant = if k % 2 == 0 { 0.1 } else { -0.1 };
        *block = Block::default().with_curve(if k % 2 == 0 { 600.0 } else { -600.0 }, cant);
    }
    let compiled = compile(RouteData::new(settings(), blocks));
    let elements = compiled.track.elements();
    for pair in elements.windows(2) {
        let delta = pair[1].curve_cant - pair[0].curve_cant;
        if delta == 0.0 {
            continue;
        }
        let a = pair[0].curve_cant_tangent / delta;
        let b = pair[1].curve_cant_tangent / delta;
        assert!(a * a + b * b <= 9.0 + 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Turn smoothing
// ---------------------------------------------------------------------------

#[test]
fn undeclared_kink_is_smoothed() {
    let mut blocks = vec![Block::default(); 6];
    blocks[2] = Block::default().with_turn(10.0_f64.to_radians().tan());
    let route = RouteData::new(
        RouteSettings {
            smooth_turns: true,
            ..settings()
        },
        blocks,
    );
    let compiled = compile(route);

    let report = compiled.smoothing.expect("smoothing should have run");
    assert_eq!(report.turns_corrected, 1);
    assert!(report.total_shortage > 0.0);

    let elements = compiled.track.elements();
    assert_eq!(elements.len(), 5 * 5 + 1);
    assert!(elements.windows(2).all(|w| w[0].start < w[1].start));
}

#[test]
fn smoothing_is_skipped_for_short_blocks() {
    let route = RouteData::new(
        RouteSettings {
            block_interval: 8.0,
            smooth_turns: true,
            ..settings()
        },
        vec![Block::default().with_turn(0.2); 4],
    );
    let compiled = compile(route);
    assert!(compiled.smoothing.is_none());
    assert_eq!(compiled.track.len(), 4);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn background_on_first_block_changes_to_itself() {
    let mut route = straight(2);
    route.backgrounds = 3;
    route.blocks[0].background = Some(2);
    let compiled = compile(route);

    let first = &compiled.track.elements()[0].events[0];
    assert_eq!(first.delta, 0.0);
    assert_eq!(
        first.kind,
        EventKind::BackgroundChange {
            previous: 2,
            next: 2
        }
    );
}

#[test]
fn background_before_first_used_block_is_not_inherited() {
    let mut route = straight(5);
    route.backgrounds = 3;
    route.settings.first_used_block = 2;
    route.blocks[0].background = Some(1);
    route.blocks[3].background = Some(2);
    let compiled = compile(route);

    assert!(events(&compiled, 1).contains(&&EventKind::BackgroundChange {
        previous: 0,
        next: 2
    }));
}

#[test]
fn first_block_fog_is_published_as_initial_fog() {
    let haze = Fog::new(100.0, 400.0, Color24::new(10, 20, 30), 0.0);
    let mut route = straight(3);
    route.blocks[0].fog = haze;
    let compiled = compile(route);

    assert_eq!(
        compiled.initial_fog,
        Some(FogState {
            previous: haze,
            current: haze,
            next: haze
        })
    );
    assert!(events(&compiled, 0)
        .iter()
        .all(|e| !matches!(e, EventKind::FogChange { .. })));
}

#[test]
fn first_fog_change_seeds_initial_fog_in_transition_mode() {
    let haze = Fog::new(100.0, 400.0, Color24::new(10, 20, 30), 0.0);
    let mut route = straight(3);
    route.settings.fog_transition_mode = true;
    route.blocks[1].fog = haze;
    route.blocks[1].fog_defined = true;
    let compiled = compile(route);

    let state = compiled.initial_fog.expect("initial fog");
    assert_eq!(state.previous, Fog::clear(-25.0));
    assert_eq!(state.current, Fog::clear(-25.0));
    assert_eq!(state.next, haze.at(25.0));
}

#[test]
fn unknown_background_is_ignored() {
    let mut route = straight(2);
    route.backgrounds = 1;
    route.blocks[1].background = Some(4);
    let compiled = compile(route);
    assert!(!events(&compiled, 1)
        .iter()
        .any(|e| matches!(e, EventKind::BackgroundChange { .. })));
}

#[test]
fn limits_chain_previous_values() {
    let mut route = straight(3);
    for (i, speed) in [(0, 20.0), (2, 15.0)] {
        route.blocks[i].limits.push(trackgen::route::Limit {
            track_position: i as f64 * 25.0 + 5.0,
            speed,
            direction: 0,
            course: 0,
        });
    }
    let compiled = compile(route);

    let limits: Vec<(f64, f64)> = compiled
        .track
        .absolute_events()
        .filter_map(|(_, e)| match e.kind {
            EventKind::LimitChange { previous, next } => Some((previous, next)),
            _ => None,
        })
        .collect();
    assert_eq!(limits, vec![(f64::INFINITY, 20.0), (20.0, 15.0)]);
}

#[test]
fn station_without_stops_becomes_all_pass() {
    let mut route = straight(3);
    route.stations.push(Station::new("Hillside"));
    route.blocks[1].station = Some(0);
    let compiled = compile(route);

    assert_eq!(compiled.stations[0].stop_mode, StopMode::AllPass);
    assert!(compiled.diagnostics.warnings().count() >= 1);
    assert!(events(&compiled, 1).contains(&&EventKind::StationStart { station: 0 }));
}

#[test]
fn station_end_follows_last_stop() {
    let mut route = straight(5);
    route.stations.push(Station::new("Terminus"));
    route.blocks[1].station = Some(0);
    route.blocks[1].stops.push(Stop {
        track_position: 40.0,
        station: 0,
        direction: 0,
        forward_tolerance: 5.0,
        backward_tolerance: 5.0,
        cars: 0,
    });
    let compiled = compile(route);

    assert_eq!(compiled.stations[0].stops.len(), 1);
    let end = compiled
        .track
        .absolute_events()
        .find(|(_, e)| e.kind == EventKind::StationEnd { station: 0 })
        .map(|(p, _)| p);
    assert_eq!(end, Some(70.0));
    // a station with stops gets a default point of interest
    assert_eq!(compiled.points_of_interest.len(), 1);
}

#[test]
fn undefined_station_is_reported() {
    let mut route = straight(2);
    route.blocks[0].station = Some(3);
    let compiled = compile(route);
    assert_eq!(compiled.diagnostics.errors().count(), 1);
    assert!(events(&compiled, 0)
        .iter()
        .all(|e| !matches!(e, EventKind::StationStart { .. })));
}

// ---------------------------------------------------------------------------
// Sections and transponders
// ---------------------------------------------------------------------------

#[test]
fn sections_link_to_neighbours() {
    let mut route = straight(4);
    route.blocks[0].sections.push(section(0.0));
    route.blocks[2].sections.push(section(50.0));
    let compiled = compile(route);

    assert_eq!(compiled.sections.len(), 2);
    assert_eq!(compiled.sections[0].previous, None);
    assert_eq!(compiled.sections[0].next, Some(1));
    assert_eq!(compiled.sections[1].previous, Some(0));
    assert!(events(&compiled, 2).contains(&&EventKind::SectionChange {
        previous: Some(0),
        next: 1
    }));
}

#[test]
fn block_without_listed_rails_still_creates_sections() {
    let mut route = straight(3);
    route.blocks[1].rails.clear();
    route.blocks[1].sections.push(section(30.0));
    route.blocks[2].sections.push(section(55.0));
    let compiled = compile(route);

    assert_eq!(compiled.sections.len(), 2);
    assert!(events(&compiled, 1).contains(&&EventKind::SectionChange {
        previous: None,
        next: 0
    }));
}

#[test]
fn transponders_attach_exactly_once() {
    let mut route = straight(4);
    route.blocks[0].sections.push(section(0.0));
    // waits for a section declared two blocks later
    route.blocks[1].transponders.push(transponder(30.0, 1));
    route.blocks[2].sections.push(section(55.0));
    // never declared
    route.blocks[3].transponders.push(transponder(80.0, 5));
    let compiled = compile(route);

    let beacons: Vec<(f64, i32)> = compiled
        .track
        .absolute_events()
        .filter_map(|(p, e)| match e.kind {
            EventKind::Transponder { section, .. } => Some((p, section)),
            _ => None,
        })
        .collect();
    assert_eq!(beacons, vec![(30.0, 1), (80.0, -1)]);
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[test]
fn rails_are_placed_on_every_block() {
    let mut route = straight(3);
    let handle = ObjectHandle(11);
    route.structures.register(StructureKind::Rail, 0, handle);
    let mut sink = RecordingSink::new();
    let outcome = Synthesizer::new().run(route, &mut sink).expect("synthesis");
    assert!(outcome.completed().is_some());

    let placed: Vec<f64> = sink.placements_of(handle).map(|p| p.position.z).collect();
    assert_eq!(placed.len(), 3);
    for (k, z) in placed.into_iter().enumerate() {
        assert_relative_eq!(z, 25.0 * k as f64, epsilon = TOLERANCE);
    }
}

#[test]
fn poles_follow_their_interval() {
    let handle = ObjectHandle(21);
    let placed = |interval: f64| {
        let mut route = straight(4);
        route.structures.register(StructureKind::Pole(0), 0, handle);
        for block in &mut route.blocks {
            block.poles = vec![Some(Pole {
                mode: 0,
                location: -1.0,
                interval,
                structure: 0,
            })];
        }
        let mut sink = RecordingSink::new();
        Synthesizer::new().run(route, &mut sink).expect("synthesis");
        sink.placements_of(handle).count()
    };

    assert_eq!(placed(25.0), 4);
    assert_eq!(placed(50.0), 2);
    // a zero interval has no phase and places nothing
    assert_eq!(placed(0.0), 0);
}

#[test]
fn missing_free_object_is_diagnosed() {
    let mut route = straight(2);
    route.blocks[0].ground_free_objects.push(FreeObject {
        track_position: 10.0,
        structure: 4,
        x: 0.0,
        y: 0.0,
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    });
    let mut sink = RecordingSink::new();
    let compiled = Synthesizer::new()
        .run(route, &mut sink)
        .expect("synthesis")
        .completed()
        .expect("completed");
    assert!(sink.objects.is_empty());
    assert_eq!(compiled.diagnostics.errors().count(), 1);
}

// ---------------------------------------------------------------------------
// Session control
// ---------------------------------------------------------------------------

#[test]
fn raised_cancel_flag_discards_output() {
    let cancel = AtomicBool::new(true);
    let outcome = Synthesizer::new()
        .with_cancel_flag(&cancel)
        .run(straight(40), &mut NullSink)
        .expect("cancellation is not an error");
    assert!(matches!(outcome, Outcome::Cancelled));
}

#[test]
fn progress_is_monotone_and_finishes_at_one() {
    let seen = RefCell::new(Vec::new());
    let outcome = Synthesizer::new()
        .with_progress(|f| seen.borrow_mut().push(f))
        .run(straight(20), &mut NullSink)
        .expect("synthesis");
    assert!(outcome.completed().is_some());

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 21);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&1.0));
}

#[test]
fn empty_block_table_is_rejected() {
    let result = Synthesizer::new().run(RouteData::new(settings(), Vec::new()), &mut NullSink);
    assert!(matches!(result, Err(SynthesisError::EmptyBlockTable)));
}

#[test]
fn first_block_past_table_is_rejected() {
    let mut route = straight(3);
    route.settings.first_used_block = 3;
    let result = Synthesizer::new().run(route, &mut NullSink);
    assert_eq!(
        result.err(),
        Some(SynthesisError::FirstBlockOutOfRange { first: 3, len: 3 })
    );
}

#[test]
fn first_used_block_skips_leading_blocks() {
    let mut route = straight(5);
    route.settings.first_used_block = 2;
    let compiled = compile(route);
    assert_eq!(compiled.track.len(), 3);
    assert_eq!(compiled.track.elements()[0].start, 50.0);
}
