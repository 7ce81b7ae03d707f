//! Passes over the finished walk that need the whole track.

use crate::error::Diagnostics;
use crate::geometry::{signum, Vector3};
use crate::route::{PointOfInterest, SafetySystem, Station, StationType, StopMode, TransponderType};
use crate::track::{EventKind, TrackElement};

/// Largest speed, in km/h, a packed beacon can carry.
const MAX_BEACON_SPEED: u32 = 4095;
/// Largest track position, in meters, a packed beacon can carry.
const MAX_BEACON_DISTANCE: u32 = 1_048_575;
const BEACON_DISTANCE_SHIFT: u32 = 12;

const DEFAULT_POI_SIDE: f64 = 2.5;
const DEFAULT_POI_HEIGHT: f64 = 2.8;

/// Adds a station end event one interval past the last stop of each station.
pub(super) fn insert_station_ends(
    elements: &mut [TrackElement],
    stations: &[Station],
    interval: f64,
    first: usize,
) {
    for (index, station) in stations.iter().enumerate() {
        let Some(stop) = station.stops.last() else {
            continue;
        };
        let p = stop.track_position + stop.forward_tolerance + interval;
        let block = (p / interval).floor();
        if block < first as f64 {
            continue;
        }
        let k = block as usize - first;
        let Some(element) = elements.get_mut(k) else {
            continue;
        };
        let delta = p - (k + first) as f64 * interval;
        element.push_event(delta, EventKind::StationEnd { station: index });
    }
}

/// One point of interest per station with stops, at its first stop.
pub(super) fn default_points_of_interest(stations: &[Station]) -> Vec<PointOfInterest> {
    stations
        .iter()
        .filter_map(|station| {
            let stop = station.stops.first()?;
            Some(PointOfInterest {
                track_position: stop.track_position,
                offset: Vector3::new(
                    station.door_side_offset(DEFAULT_POI_SIDE),
                    DEFAULT_POI_HEIGHT,
                    0.0,
                ),
                yaw: 0.0,
                pitch: 0.0,
                roll: 0.0,
                text: station.name.clone(),
            })
        })
        .collect()
}

/// Turns per-block cant into cant at element starts.
///
/// A flat element inherits the preceding cant. Where both are canted the
/// larger magnitude wins on the same side and the mean is taken across a
/// reversal.
pub(super) fn convert_block_cant(elements: &mut [TrackElement]) {
    for i in (1..elements.len()).rev() {
        let previous = elements[i - 1].curve_cant;
        let current = &mut elements[i].curve_cant;
        if *current == 0.0 {
            *current = previous;
        } else if previous != 0.0 {
            if signum(previous) == signum(*current) {
                if previous.abs() > current.abs() {
                    *current = previous;
                }
            } else {
                *current = 0.5 * (*current + previous);
            }
        }
    }
}

/// Repairs station stop modes and types that cannot be honored.
pub(super) fn validate_stations(stations: &mut [Station], diagnostics: &mut Diagnostics) {
    let count = stations.len();
    for i in 0..count {
        if stations[i].stops.is_empty() && stations[i].stop_mode != StopMode::AllPass {
            diagnostics.warn(format!(
                "Station {} expects trains to stop but does not define stop points at track position {}",
                stations[i].name, stations[i].default_track_position
            ));
            stations[i].stop_mode = StopMode::AllPass;
        }
        if stations[i].station_type != StationType::ChangeEnds {
            continue;
        }
        if i + 1 < count {
            if stations[i + 1].stop_mode != StopMode::AllStop {
                diagnostics.warn(format!(
                    "Station {} is marked as \"change ends\" but the subsequent station does not expect all trains to stop",
                    stations[i].name
                ));
                stations[i + 1].stop_mode = StopMode::AllStop;
            }
        } else {
            diagnostics.warn(format!(
                "Station {} is marked as \"change ends\" but there is no subsequent station defined",
                stations[i].name
            ));
            stations[i].station_type = StationType::Terminal;
        }
    }
    if let Some(last) = stations.last_mut() {
        last.station_type = StationType::Terminal;
    }
}

pub(super) fn insert_track_end(elements: &mut [TrackElement], interval: f64) {
    if let Some(last) = elements.last_mut() {
        last.push_event(interval, EventKind::TrackEnd);
    }
}

fn beacon(transponder_type: TransponderType, data: i32) -> EventKind {
    EventKind::Transponder {
        transponder_type,
        data,
        section: 0,
        clip_to_first_red_section: false,
    }
}

/// Packs a speed and a track position into one beacon payload.
fn pack(speed: u32, track_position: f64) -> i32 {
    let distance = (track_position.round().max(0.0) as u32).min(MAX_BEACON_DISTANCE);
    (speed | (distance << BEACON_DISTANCE_SHIFT)) as i32
}

/// Inserts the beacons legacy safety systems expect.
///
/// ATC track-status beacons mark where ATC territory begins and ends at
/// stations. Speed limits inside ATC territory and every temporary ATS-P
/// limit are packed into beacons gathered on the first element.
pub(super) fn insert_safety_beacons(elements: &mut [TrackElement], stations: &[Station]) {
    let system = |station: usize| {
        stations
            .get(station)
            .map_or(SafetySystem::Any, |s| s.safety_system)
    };
    let mut atc = false;
    let mut gathered = Vec::new();

    for element in elements.iter_mut() {
        let mut appended = Vec::new();
        for event in &element.events {
            let status = match event.kind {
                EventKind::StationStart { station } if !atc => {
                    if system(station) == SafetySystem::Atc {
                        atc = true;
                        Some([0, 1])
                    } else {
                        None
                    }
                }
                EventKind::StationStart { station } => {
                    (system(station) == SafetySystem::Ats).then_some([2, 3])
                }
                EventKind::StationEnd { station } if atc => match system(station) {
                    SafetySystem::Atc => Some([1, 2]),
                    SafetySystem::Ats => {
                        atc = false;
                        Some([3, 0])
                    }
                    SafetySystem::Any => None,
                },
                EventKind::LimitChange { next, .. } if atc => {
                    let speed = (3.6 * next).min(f64::from(MAX_BEACON_SPEED)).round() as u32;
                    let data = pack(speed, element.start + event.delta);
                    gathered.push(beacon(TransponderType::AtcSpeedLimit, data));
                    None
                }
                EventKind::Transponder {
                    transponder_type: TransponderType::InternalAtsPTemporarySpeedLimit,
                    data,
                    ..
                } => {
                    let speed = data.min(MAX_BEACON_SPEED as i32) as u32;
                    let data = pack(speed, element.start + event.delta);
                    gathered.push(beacon(TransponderType::AtsPTemporarySpeedLimit, data));
                    None
                }
                _ => None,
            };
            if let Some(values) = status {
                appended.extend(values.map(|v| beacon(TransponderType::AtcTrackStatus, v)));
            }
        }
        for kind in appended {
            element.push_event(0.0, kind);
        }
    }

    if let Some(first) = elements.first_mut() {
        for kind in gathered {
            first.push_event(0.0, kind);
        }
    }
}
