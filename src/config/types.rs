//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::defaults::*;

// ============================================
// TIMING
// ============================================

/// Input timing for the key disambiguators and held navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    /// Hold duration that deletes the selected bench (default: 2000)
    #[serde(default = "default_hold_to_delete_ms")]
    pub hold_to_delete_ms: u64,
    /// Rename vs. edit-category double-tap window (default: 200)
    #[serde(default = "default_rename_double_tap_ms")]
    pub rename_double_tap_ms: u64,
    /// Enter-category vs. toggle-favorite double-tap window (default: 200)
    #[serde(default = "default_favorite_double_tap_ms")]
    pub favorite_double_tap_ms: u64,
    /// Quick-rest vs. recall double-tap window (default: 350)
    #[serde(default = "default_quick_rest_double_tap_ms")]
    pub quick_rest_double_tap_ms: u64,
    #[serde(default = "default_nav_initial_delay_ms")]
    pub nav_initial_delay_ms: u64,
    #[serde(default = "default_nav_repeat_ms")]
    pub nav_repeat_ms: u64,
}

fn default_hold_to_delete_ms() -> u64 {
    DEFAULT_HOLD_TO_DELETE_MS
}
fn default_rename_double_tap_ms() -> u64 {
    DEFAULT_RENAME_DOUBLE_TAP_MS
}
fn default_favorite_double_tap_ms() -> u64 {
    DEFAULT_FAVORITE_DOUBLE_TAP_MS
}
fn default_quick_rest_double_tap_ms() -> u64 {
    DEFAULT_QUICK_REST_DOUBLE_TAP_MS
}
fn default_nav_initial_delay_ms() -> u64 {
    DEFAULT_NAV_INITIAL_DELAY_MS
}
fn default_nav_repeat_ms() -> u64 {
    DEFAULT_NAV_REPEAT_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            hold_to_delete_ms: DEFAULT_HOLD_TO_DELETE_MS,
            rename_double_tap_ms: DEFAULT_RENAME_DOUBLE_TAP_MS,
            favorite_double_tap_ms: DEFAULT_FAVORITE_DOUBLE_TAP_MS,
            quick_rest_double_tap_ms: DEFAULT_QUICK_REST_DOUBLE_TAP_MS,
            nav_initial_delay_ms: DEFAULT_NAV_INITIAL_DELAY_MS,
            nav_repeat_ms: DEFAULT_NAV_REPEAT_MS,
        }
    }
}

impl TimingConfig {
    pub fn hold_to_delete(&self) -> Duration {
        Duration::from_millis(self.hold_to_delete_ms)
    }
    pub fn rename_double_tap(&self) -> Duration {
        Duration::from_millis(self.rename_double_tap_ms)
    }
    pub fn favorite_double_tap(&self) -> Duration {
        Duration::from_millis(self.favorite_double_tap_ms)
    }
    pub fn quick_rest_double_tap(&self) -> Duration {
        Duration::from_millis(self.quick_rest_double_tap_ms)
    }
    pub fn nav_initial_delay(&self) -> Duration {
        Duration::from_millis(self.nav_initial_delay_ms)
    }
    pub fn nav_repeat(&self) -> Duration {
        Duration::from_millis(self.nav_repeat_ms)
    }
}

// ============================================
// TELEPORT
// ============================================

/// Bounds and offsets for the teleport state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeleportConfig {
    /// Abort a cross-scene teleport if the target scene is not active by then (default: 15000)
    #[serde(default = "default_scene_load_timeout_ms")]
    pub scene_load_timeout_ms: u64,
    /// Stop waiting for player input acceptance and position anyway (default: 6000)
    #[serde(default = "default_player_ready_timeout_ms")]
    pub player_ready_timeout_ms: u64,
    /// Minimum time spent in the new scene before positioning (default: 200)
    #[serde(default = "default_arrival_settle_ms")]
    pub arrival_settle_ms: u64,
    /// Delay between respawn scene-enter and the quick-rest reposition (default: 1000)
    #[serde(default = "default_respawn_settle_ms")]
    pub respawn_settle_ms: u64,
    /// Delay before a "bench sat" event is confirmed and recorded (default: 500)
    #[serde(default = "default_bench_confirm_delay_ms")]
    pub bench_confirm_delay_ms: u64,
    #[serde(default = "default_nearby_rest_radius")]
    pub nearby_rest_radius: f32,
    #[serde(default = "default_last_resort_lift")]
    pub last_resort_lift: f32,
}

fn default_scene_load_timeout_ms() -> u64 {
    DEFAULT_SCENE_LOAD_TIMEOUT_MS
}
fn default_player_ready_timeout_ms() -> u64 {
    DEFAULT_PLAYER_READY_TIMEOUT_MS
}
fn default_arrival_settle_ms() -> u64 {
    DEFAULT_ARRIVAL_SETTLE_MS
}
fn default_respawn_settle_ms() -> u64 {
    DEFAULT_RESPAWN_SETTLE_MS
}
fn default_bench_confirm_delay_ms() -> u64 {
    DEFAULT_BENCH_CONFIRM_DELAY_MS
}
fn default_nearby_rest_radius() -> f32 {
    DEFAULT_NEARBY_REST_RADIUS
}
fn default_last_resort_lift() -> f32 {
    DEFAULT_LAST_RESORT_LIFT
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            scene_load_timeout_ms: DEFAULT_SCENE_LOAD_TIMEOUT_MS,
            player_ready_timeout_ms: DEFAULT_PLAYER_READY_TIMEOUT_MS,
            arrival_settle_ms: DEFAULT_ARRIVAL_SETTLE_MS,
            respawn_settle_ms: DEFAULT_RESPAWN_SETTLE_MS,
            bench_confirm_delay_ms: DEFAULT_BENCH_CONFIRM_DELAY_MS,
            nearby_rest_radius: DEFAULT_NEARBY_REST_RADIUS,
            last_resort_lift: DEFAULT_LAST_RESORT_LIFT,
        }
    }
}

impl TeleportConfig {
    pub fn scene_load_timeout(&self) -> Duration {
        Duration::from_millis(self.scene_load_timeout_ms)
    }
    pub fn player_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.player_ready_timeout_ms)
    }
    pub fn arrival_settle(&self) -> Duration {
        Duration::from_millis(self.arrival_settle_ms)
    }
    pub fn respawn_settle(&self) -> Duration {
        Duration::from_millis(self.respawn_settle_ms)
    }
    pub fn bench_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.bench_confirm_delay_ms)
    }
}

// ============================================
// REGISTRY
// ============================================

/// Bench recording and dedup behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Fixed spatial dedup radius; when unset the camera view width is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_radius: Option<f32>,
    /// Dedup radius when the camera view width is unavailable (default: 50.0)
    #[serde(default = "default_merge_radius_fallback")]
    pub merge_radius_fallback: f32,
    /// Regexes matched against marker ids; matches are never recorded
    #[serde(default = "default_ignored_marker_patterns")]
    pub ignored_marker_patterns: Vec<String>,
    /// Record every known bench on the first scene-enter of a session (default: false)
    #[serde(default = "default_import_all_on_enter")]
    pub import_all_on_enter: bool,
    /// Seed an empty registry with the player's respawn bench (default: true)
    #[serde(default = "default_seed_from_respawn_point")]
    pub seed_from_respawn_point: bool,
}

fn default_merge_radius_fallback() -> f32 {
    DEFAULT_MERGE_RADIUS_FALLBACK
}
fn default_ignored_marker_patterns() -> Vec<String> {
    DEFAULT_IGNORED_MARKER_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_import_all_on_enter() -> bool {
    DEFAULT_IMPORT_ALL_ON_ENTER
}
fn default_seed_from_respawn_point() -> bool {
    DEFAULT_SEED_FROM_RESPAWN_POINT
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            merge_radius: None,
            merge_radius_fallback: DEFAULT_MERGE_RADIUS_FALLBACK,
            ignored_marker_patterns: default_ignored_marker_patterns(),
            import_all_on_enter: DEFAULT_IMPORT_ALL_ON_ENTER,
            seed_from_respawn_point: DEFAULT_SEED_FROM_RESPAWN_POINT,
        }
    }
}

impl RegistryConfig {
    /// Compile the ignore patterns, skipping (and logging) invalid ones.
    pub fn compiled_ignore_patterns(&self) -> Vec<Regex> {
        self.ignored_marker_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Skipping invalid ignored marker pattern");
                    None
                }
            })
            .collect()
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teleport: Option<TeleportConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
    /// Raise the default log filter to debug for this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<bool>,
}

impl Config {
    pub fn get_timing(&self) -> TimingConfig {
        self.timing.clone().unwrap_or_default()
    }

    pub fn get_teleport(&self) -> TeleportConfig {
        self.teleport.clone().unwrap_or_default()
    }

    pub fn get_registry(&self) -> RegistryConfig {
        self.registry.clone().unwrap_or_default()
    }

    pub fn get_debug_log(&self) -> bool {
        self.debug_log.unwrap_or(false)
    }
}
