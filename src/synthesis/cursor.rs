use crate::geometry::{Chord, Vector2, Vector3};
use crate::route::{Block, Fog};

/// Location of an event already pushed onto the track, for back-patching.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct EventRef {
    pub element: usize,
    pub event: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct BrightnessCarry {
    pub value: f64,
    pub track_position: f64,
    pub last_event: Option<EventRef>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FogCarry {
    pub previous: Fog,
    pub current: Fog,
    pub last_event: Option<EventRef>,
}

/// State carried from one block to the next during the walk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cursor {
    pub position: Vector3,
    pub heading: Vector2,
    /// Speed limit in force, in meters per second.
    pub speed_limit: f64,
    pub run_sound: usize,
    pub flange_sound: usize,
    pub brightness: BrightnessCarry,
    pub fog: FogCarry,
}

impl Cursor {
    /// Cursor at the origin heading +Z, seeded with the first declared brightness.
    pub fn new(blocks: &[Block], first: usize, interval: f64) -> Self {
        let brightness = blocks
            .get(first..)
            .unwrap_or_default()
            .iter()
            .find_map(|b| b.brightness.first())
            .map(|s| (s.value, s.track_position))
            .unwrap_or((1.0, first as f64 * interval));

        Self {
            position: Vector3::ZERO,
            heading: Vector2::FORWARD,
            speed_limit: f64::INFINITY,
            run_sound: 0,
            flange_sound: 0,
            brightness: BrightnessCarry {
                value: brightness.0,
                track_position: brightness.1,
                last_event: None,
            },
            fog: FogCarry {
                previous: Fog::clear(-interval),
                current: Fog::clear(0.0),
                last_event: None,
            },
        }
    }

    /// Applies a declared turn given as a ratio and returns the rotation used.
    pub fn turn(&mut self, ratio: f64) -> (f64, f64) {
        let angle = -ratio.atan();
        let (sin, cos) = angle.sin_cos();
        self.heading = self.heading.rotate(cos, sin);
        (cos, sin)
    }

    /// Turns the heading through half of the block's arc.
    pub fn sweep_half(&mut self, chord: &Chord) {
        if chord.half_angle != 0.0 {
            self.heading = self.heading.rotate_by(-chord.half_angle);
        }
    }

    /// Moves along the chord, then turns through the second half of the arc.
    pub fn advance(&mut self, chord: &Chord) {
        self.position += Vector3::new(
            self.heading.x * chord.length,
            chord.rise,
            self.heading.y * chord.length,
        );
        self.sweep_half(chord);
    }
}
