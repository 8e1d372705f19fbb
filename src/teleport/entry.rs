//! Entry-point choice for cross-scene teleports.

use crate::host::TransitionPoint;

const DIRECTIONAL: [&str; 4] = ["left", "right", "top", "bot"];

/// Pick the transition to enter `scene` through when the caller gave none.
///
/// Inactive transitions are skipped. A door wins over a directional edge
/// exit, which wins over anything else; no usable transition yields `""`.
pub fn choose_entry_point(points: &[TransitionPoint]) -> String {
    let usable: Vec<&TransitionPoint> = points
        .iter()
        .filter(|p| !p.inactive && !p.name.trim().is_empty())
        .collect();

    let lower = |p: &&TransitionPoint| p.name.to_ascii_lowercase();

    usable
        .iter()
        .find(|p| lower(p).contains("door"))
        .or_else(|| {
            usable
                .iter()
                .find(|p| DIRECTIONAL.iter().any(|d| lower(p).contains(d)))
        })
        .or_else(|| usable.first())
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, inactive: bool) -> TransitionPoint {
        TransitionPoint {
            name: name.to_string(),
            inactive,
        }
    }

    #[test]
    fn test_door_preferred() {
        let points = vec![
            point("left1", false),
            point("top1", false),
            point("door_station", false),
        ];
        assert_eq!(choose_entry_point(&points), "door_station");
    }

    #[test]
    fn test_directional_before_other() {
        let points = vec![point("warp", false), point("Bot2", false)];
        assert_eq!(choose_entry_point(&points), "Bot2");
    }

    #[test]
    fn test_any_then_empty() {
        assert_eq!(choose_entry_point(&[point("warp", false)]), "warp");
        assert_eq!(choose_entry_point(&[]), "");
    }

    #[test]
    fn test_inactive_skipped() {
        let points = vec![point("door1", true), point("right1", false)];
        assert_eq!(choose_entry_point(&points), "right1");
        assert_eq!(choose_entry_point(&[point("door1", true)]), "");
    }
}
