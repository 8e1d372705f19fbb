//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Hold the rename key this long to delete the selected bench
pub const DEFAULT_HOLD_TO_DELETE_MS: u64 = 2000;

/// Double-tap windows
pub const DEFAULT_RENAME_DOUBLE_TAP_MS: u64 = 200;
pub const DEFAULT_FAVORITE_DOUBLE_TAP_MS: u64 = 200;
pub const DEFAULT_QUICK_REST_DOUBLE_TAP_MS: u64 = 350;

/// Held navigation keys: first repeat after the initial delay, then every repeat interval
pub const DEFAULT_NAV_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_NAV_REPEAT_MS: u64 = 80;

/// Teleport waits
pub const DEFAULT_SCENE_LOAD_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_PLAYER_READY_TIMEOUT_MS: u64 = 6_000;
pub const DEFAULT_ARRIVAL_SETTLE_MS: u64 = 200;
pub const DEFAULT_RESPAWN_SETTLE_MS: u64 = 1_000;
pub const DEFAULT_BENCH_CONFIRM_DELAY_MS: u64 = 500;

/// Radius (world units) around rest entities when a marker name lookup misses
pub const DEFAULT_NEARBY_REST_RADIUS: f32 = 15.0;

/// Upward nudge applied when no probe offset clears the terrain
pub const DEFAULT_LAST_RESORT_LIFT: f32 = 2.0;

/// Spatial dedup radius when the camera cannot report its view width
pub const DEFAULT_MERGE_RADIUS_FALLBACK: f32 = 50.0;

/// Markers matching any of these patterns are never recorded
pub const DEFAULT_IGNORED_MARKER_PATTERNS: &[&str] = &[r"CustomRestBench\(Clone\)"];

/// Registry maintenance flags
pub const DEFAULT_IMPORT_ALL_ON_ENTER: bool = false;
pub const DEFAULT_SEED_FROM_RESPAWN_POINT: bool = true;

/// Config file location
pub const DEFAULT_CONFIG_PATH: &str = "~/.bench-teleport/config.json";
