//! Bounded probe that moves the player out of terrain after a teleport.

use crate::geometry::Vec2;
use crate::host::WorldQuery;

/// Candidates tried in order: up, further up, slight up, left-up, right-up,
/// further left, further right.
pub const SAFETY_OFFSETS: [Vec2; 7] = [
    Vec2::new(0.0, 2.0),
    Vec2::new(0.0, 4.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 2.0),
    Vec2::new(1.0, 2.0),
    Vec2::new(-2.0, 0.0),
    Vec2::new(2.0, 0.0),
];

/// First terrain-free position near `position` for a body of `size`.
///
/// Returns the position unchanged when it is already clear. When every
/// candidate overlaps, lifts by `last_resort_lift` unconditionally. The
/// second value reports whether the position moved.
pub fn find_safe_position(
    world: &dyn WorldQuery,
    position: Vec2,
    size: Vec2,
    last_resort_lift: f32,
) -> (Vec2, bool) {
    if !world.overlaps_terrain(position, size) {
        return (position, false);
    }
    let candidate = SAFETY_OFFSETS
        .iter()
        .map(|offset| position + *offset)
        .find(|candidate| !world.overlaps_terrain(*candidate, size));
    match candidate {
        Some(candidate) => (candidate, true),
        None => (position + Vec2::new(0.0, last_resort_lift), true),
    }
}
