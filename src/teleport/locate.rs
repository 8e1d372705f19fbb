//! Resolving teleport targets to positions in the active scene.

use tracing::debug;

use crate::geometry::Vec2;
use crate::host::{AnchorMarker, WorldQuery};

/// How closely an anchor's name matches the wanted marker. Lower is better.
fn name_match_rank(anchor: &str, wanted: &str) -> Option<u8> {
    let (anchor, wanted) = (anchor.to_ascii_lowercase(), wanted.to_ascii_lowercase());
    if anchor == wanted {
        Some(0)
    } else if anchor.contains(&wanted) {
        Some(1)
    } else if wanted.contains(&anchor) {
        Some(2)
    } else {
        None
    }
}

/// Position of `marker` in the active scene.
///
/// Exact lookup first. Otherwise every rest spot is paired with the anchors
/// within `radius` of it whose names relate to `marker`; the best name match,
/// then the closest pair, wins and the rest spot's position is used.
pub fn resolve_marker(world: &dyn WorldQuery, marker: &str, radius: f32) -> Option<Vec2> {
    if let Some(position) = world.marker_position(marker) {
        return Some(position);
    }

    let anchors: Vec<(u8, AnchorMarker)> = world
        .anchor_markers()
        .into_iter()
        .filter(|a| !a.position.is_zero())
        .filter_map(|a| name_match_rank(&a.name, marker).map(|rank| (rank, a)))
        .collect();
    if anchors.is_empty() {
        return None;
    }

    let radius_sq = radius * radius;
    let best = world
        .rest_spots()
        .into_iter()
        .flat_map(|spot| {
            anchors.iter().filter_map(move |(rank, anchor)| {
                let d = spot.distance_squared(anchor.position);
                (d <= radius_sq).then_some((*rank, d, spot, anchor.name.as_str()))
            })
        })
        .min_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    best.map(|(rank, _, spot, anchor)| {
        debug!(marker, anchor, rank, "Resolved marker through nearby rest spot");
        spot
    })
}

/// Nearest non-origin anchor to `position`, with the offset from it.
pub fn nearest_anchor(world: &dyn WorldQuery, position: Vec2) -> Option<(String, Vec2)> {
    world
        .anchor_markers()
        .into_iter()
        .filter(|a| !a.position.is_zero())
        .min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
        .map(|a| (a.name, position - a.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;

    #[test]
    fn test_exact_lookup_wins() {
        let mut host = SimHost::new("A");
        host.add_marker("A", "RestBench", Vec2::new(5.0, 1.0));
        assert_eq!(resolve_marker(&host, "RestBench", 15.0), Some(Vec2::new(5.0, 1.0)));
    }

    #[test]
    fn test_fallback_through_rest_spot() {
        let mut host = SimHost::new("A");
        host.add_marker("A", "RestBench (1)", Vec2::new(40.0, 0.0));
        host.add_marker("A", "RestBench Far", Vec2::new(400.0, 0.0));
        host.add_rest_spot("A", Vec2::new(45.0, 1.0));
        host.add_rest_spot("A", Vec2::new(900.0, 1.0));

        assert_eq!(resolve_marker(&host, "RestBench", 15.0), Some(Vec2::new(45.0, 1.0)));
    }

    #[test]
    fn test_fallback_prefers_better_name_match() {
        let mut host = SimHost::new("A");
        host.add_marker("A", "Bench", Vec2::new(10.0, 0.0));
        host.add_marker("A", "Bench_Upper_Extra", Vec2::new(100.0, 0.0));
        host.add_rest_spot("A", Vec2::new(11.0, 0.0));
        host.add_rest_spot("A", Vec2::new(100.0, 1.0));

        // "Bench_Upper_Extra" contains the wanted name, beating "Bench" which is only contained
        assert_eq!(
            resolve_marker(&host, "Bench_Upper", 15.0),
            Some(Vec2::new(100.0, 1.0))
        );
    }

    #[test]
    fn test_unresolvable() {
        let mut host = SimHost::new("A");
        host.add_marker("A", "Gate", Vec2::new(10.0, 0.0));
        host.add_rest_spot("A", Vec2::new(10.0, 0.0));
        assert_eq!(resolve_marker(&host, "RestBench", 15.0), None);

        host.add_marker("A", "RestBench_2", Vec2::new(100.0, 0.0));
        assert_eq!(resolve_marker(&host, "RestBench", 15.0), None);
    }

    #[test]
    fn test_nearest_anchor_offset() {
        let mut host = SimHost::new("A");
        host.add_marker("A", "Near", Vec2::new(10.0, 0.0));
        host.add_marker("A", "Far", Vec2::new(100.0, 0.0));
        host.add_marker("A", "Origin", Vec2::ZERO);

        let (name, offset) = nearest_anchor(&host, Vec2::new(3.0, 2.0)).unwrap();
        assert_eq!(name, "Near");
        assert_eq!(offset, Vec2::new(-7.0, 2.0));

        let empty = SimHost::new("B");
        assert!(nearest_anchor(&empty, Vec2::ZERO).is_none());
    }
}
