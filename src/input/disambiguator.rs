//! Short/long press and single/double trigger classification.
//!
//! # State Machine
//!
//! ```text
//!              press                    release (< hold)
//!  ┌──────┐ ─────────▶ ┌──────┐ ─────────────────────────▶ ┌───────────────┐
//!  │ Idle │            │ Held │                             │ PendingSingle │
//!  └──────┘ ◀───────── └──────┘                             └───────────────┘
//!     ▲   release after   │ held ≥ hold: Long (latched)       │        │
//!     │   Long (silent)   ▼                                   │        │ window elapsed:
//!     │                 Long                                  │        ▼ Single
//!     │                                  press+release same   │
//!     └────────────────────────────────── target in window: Double
//! ```
//!
//! Time is always passed in explicitly. The owner calls [`InputDisambiguator::poll`]
//! once per tick to fire timed gestures.

use std::time::{Duration, Instant};
use tracing::debug;

/// Timing parameters for one input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Holding this long fires [`Gesture::Long`]. `None` disables long presses.
    pub hold_threshold: Option<Duration>,
    /// Second release within this window fires [`Gesture::Double`]. Zero fires
    /// [`Gesture::Single`] on release with no double detection.
    pub double_window: Duration,
}

impl GestureConfig {
    pub fn new(double_window: Duration) -> Self {
        Self {
            hold_threshold: None,
            double_window,
        }
    }

    pub fn with_hold(mut self, threshold: Duration) -> Self {
        self.hold_threshold = Some(threshold);
        self
    }

    /// Single-only channel: release fires immediately.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// A classified gesture, carrying the target it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture<T> {
    Single(T),
    Double(T),
    Long(T),
}

impl<T> Gesture<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Single(_) => "single",
            Gesture::Double(_) => "double",
            Gesture::Long(_) => "long",
        }
    }
}

#[derive(Debug, Clone)]
struct Held<T> {
    target: T,
    since: Instant,
    long_fired: bool,
}

#[derive(Debug, Clone)]
struct PendingSingle<T> {
    target: T,
    deadline: Instant,
}

/// Classifies press/release pairs on one key for a given target.
///
/// `T` is whatever the key acts on (a selected bench, a category, or `()`).
#[derive(Debug, Clone)]
pub struct InputDisambiguator<T> {
    config: GestureConfig,
    held: Option<Held<T>>,
    pending: Option<PendingSingle<T>>,
    overdue: Option<T>,
}

impl<T: Clone + PartialEq + std::fmt::Debug> InputDisambiguator<T> {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            held: None,
            pending: None,
            overdue: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Key went down while `target` was selected.
    pub fn press(&mut self, target: T, now: Instant) {
        self.expire(now);

        if let Some(pending) = &self.pending {
            if pending.target != target {
                debug!(stale = ?pending.target, "Pending single cancelled by press on another target");
                self.pending = None;
            }
        }

        self.held = Some(Held {
            target,
            since: now,
            long_fired: false,
        });
    }

    /// Key went up. Returns a gesture when the release decides one immediately.
    pub fn release(&mut self, now: Instant) -> Option<Gesture<T>> {
        self.expire(now);

        let held = self.held.take()?;
        if held.long_fired {
            return None;
        }

        if let Some(threshold) = self.config.hold_threshold {
            if now.duration_since(held.since) >= threshold {
                // Tick missed the threshold crossing; the hold still wins.
                self.pending = None;
                return Some(Gesture::Long(held.target));
            }
        }

        if let Some(pending) = self.pending.take() {
            if pending.target == held.target {
                return Some(Gesture::Double(held.target));
            }
        }

        if self.config.double_window.is_zero() {
            return Some(Gesture::Single(held.target));
        }

        self.pending = Some(PendingSingle {
            target: held.target,
            deadline: now + self.config.double_window,
        });
        None
    }

    /// Fire timed gestures: a long press crossing the hold threshold, or a
    /// pending single whose window elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Gesture<T>> {
        if let Some(target) = self.overdue.take() {
            return Some(Gesture::Single(target));
        }

        if let (Some(threshold), Some(held)) = (self.config.hold_threshold, self.held.as_mut()) {
            if !held.long_fired && now.duration_since(held.since) >= threshold {
                held.long_fired = true;
                self.pending = None;
                return Some(Gesture::Long(held.target.clone()));
            }
        }

        if matches!(&self.pending, Some(p) if now >= p.deadline) {
            return self.pending.take().map(|p| Gesture::Single(p.target));
        }
        None
    }

    /// A pending single that outlived its window before anyone polled is kept
    /// for the next poll instead of being lost.
    fn expire(&mut self, now: Instant) {
        if self.overdue.is_some() {
            return;
        }
        if matches!(&self.pending, Some(p) if now > p.deadline) {
            self.overdue = self.pending.take().map(|p| p.target);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some() || self.overdue.is_some()
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Drop all state without firing anything.
    pub fn reset(&mut self) {
        self.held = None;
        self.pending = None;
        self.overdue = None;
    }
}
