//! Moving the player to a bench, possibly across scenes.
//!
//! - `orchestrator` - the tick-driven state machine
//! - `locate` - marker resolution with the nearby rest-spot fallback
//! - `safety` - terrain overlap probe
//! - `entry` - entry-point heuristic for scene transitions

mod entry;
mod locate;
mod orchestrator;
mod safety;

pub use entry::choose_entry_point;
pub use locate::{nearest_anchor, resolve_marker};
pub use orchestrator::{
    TargetPoint, TeleportOrchestrator, TeleportOutcome, TeleportPhase, TeleportRequest,
};
pub use safety::{find_safe_position, SAFETY_OFFSETS};
