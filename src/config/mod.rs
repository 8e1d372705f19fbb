//! Configuration module - timing, teleport and registry settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.bench-teleport/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, TimingConfig, etc.)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_IGNORED_MARKER_PATTERNS, DEFAULT_MERGE_RADIUS_FALLBACK, DEFAULT_NEARBY_REST_RADIUS,
};

pub use types::{Config, RegistryConfig, TeleportConfig, TimingConfig};

pub use loader::{config_path, load_config, load_config_from};

#[cfg(test)]
pub use defaults::{
    DEFAULT_HOLD_TO_DELETE_MS, DEFAULT_QUICK_REST_DOUBLE_TAP_MS, DEFAULT_RENAME_DOUBLE_TAP_MS,
    DEFAULT_SCENE_LOAD_TIMEOUT_MS,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
