//! Key gesture classification.
//!
//! - `disambiguator` - short/long press and single/double trigger state machine
//! - `repeat` - held-key auto-repeat for navigation

mod disambiguator;
mod repeat;

pub use disambiguator::{Gesture, GestureConfig, InputDisambiguator};
pub use repeat::RepeatGate;

use crate::config::TimingConfig;

/// Physical keys the bench menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKey {
    Up,
    Down,
    /// Back to category level
    Left,
    /// Enter category / favorite toggle
    Right,
    Confirm,
    /// Rename, edit category, hold to delete
    Rename,
    /// Quick rest (works with the menu closed)
    QuickRest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Pressed,
    Released,
}

impl TimingConfig {
    /// Rename key on a bench: single renames, double edits its category, hold deletes.
    pub fn rename_gestures(&self) -> GestureConfig {
        GestureConfig::new(self.rename_double_tap()).with_hold(self.hold_to_delete())
    }

    /// Rename key on a category row renames the category on release. A hold
    /// is swallowed so it never turns into a rename.
    pub fn category_gestures(&self) -> GestureConfig {
        GestureConfig::immediate().with_hold(self.hold_to_delete())
    }

    /// Right key: single enters a category, double toggles favorite.
    pub fn favorite_gestures(&self) -> GestureConfig {
        GestureConfig::new(self.favorite_double_tap())
    }

    /// Quick-rest key: single arms/disarms, double recalls.
    pub fn quick_rest_gestures(&self) -> GestureConfig {
        GestureConfig::new(self.quick_rest_double_tap())
    }

    pub fn nav_repeat_gate(&self) -> RepeatGate {
        RepeatGate::new(self.nav_initial_delay(), self.nav_repeat())
    }
}
