use crate::geometry::{Chord, Transformation, Vector3};
use crate::route::Block;

use super::walk::BlockGeometry;

/// World placement of one rail across the current block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct RailFrame {
    pub position: Vector3,
    pub transform: Transformation,
    /// Horizontal divergence from rail 0 across the block, in radians.
    pub planar: f64,
    /// Vertical divergence from rail 0 across the block, in radians.
    pub updown: f64,
}

/// Resolves rail `j` of the block described by `geometry`.
///
/// Rail 0 follows the track basis. Other rails aim at where they arrive on
/// the next block; on the last block, or when the next block drops the
/// rail, they run parallel to rail 0.
pub(super) fn resolve_rail(
    blocks: &[Block],
    j: usize,
    geometry: &BlockGeometry,
    interval: f64,
) -> RailFrame {
    let parallel = |position| RailFrame {
        position,
        transform: geometry.track,
        planar: 0.0,
        updown: 0.0,
    };
    if j == 0 {
        return parallel(geometry.position);
    }

    let i = geometry.block;
    let heading = geometry.heading;
    let Some(rail) = blocks[i].rail(j) else {
        return parallel(geometry.position);
    };
    let offset = Vector3::new(heading.y * rail.start_x, rail.start_y, -heading.x * rail.start_x);
    let position = geometry.position + offset;

    let Some((next, next_rail)) = blocks
        .get(i + 1)
        .and_then(|next| next.rail(j).map(|r| (next, r)))
    else {
        return parallel(position);
    };

    let chord = &geometry.chord;
    let next_start =
        geometry.position + Vector3::new(heading.x * chord.length, chord.rise, heading.y * chord.length);

    let mut next_heading = heading;
    if chord.half_angle != 0.0 {
        next_heading = next_heading.rotate_by(-chord.half_angle);
    }
    if next.turn != 0.0 {
        next_heading = next_heading.rotate_by(-next.turn.atan());
    }
    let next_half = Chord::sweep_half_angle(interval, next.pitch, next.curve_radius);
    if next_half != 0.0 {
        next_heading = next_heading.rotate_by(-next_half);
    }

    let next_offset = Vector3::new(
        next_heading.y * next_rail.end_x,
        next_rail.end_y,
        -next_heading.x * next_rail.end_x,
    );
    let target = next_start + next_offset;

    RailFrame {
        position,
        transform: Transformation::looking_along(target - position),
        planar: ((next_rail.end_x - rail.start_x) / chord.length).atan(),
        updown: ((next_rail.end_y - rail.start_y) / chord.length).atan(),
    }
}
