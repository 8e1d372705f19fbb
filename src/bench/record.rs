//! Bench record and identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a bench: unique within the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BenchKey {
    pub scene: String,
    pub marker: String,
}

impl BenchKey {
    pub fn new(scene: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            marker: marker.into(),
        }
    }
}

impl fmt::Display for BenchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.scene, self.marker)
    }
}

/// A discovered rest point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchRecord {
    pub key: BenchKey,
    pub display_name: String,
    /// Set once the player supplies a name; auto-numbering never touches it after.
    pub is_renamed: bool,
    /// Explicit category; derived from the scene's zone when absent.
    pub parent_category: Option<String>,
    pub added_order: u64,
    pub is_favorite: bool,
    pub favorite_order: u64,
}

impl BenchRecord {
    pub fn new(key: BenchKey, display_name: impl Into<String>, added_order: u64) -> Self {
        Self {
            key,
            display_name: display_name.into(),
            is_renamed: false,
            parent_category: None,
            added_order,
            is_favorite: false,
            favorite_order: 0,
        }
    }

    pub fn scene(&self) -> &str {
        &self.key.scene
    }

    pub fn marker(&self) -> &str {
        &self.key.marker
    }
}
