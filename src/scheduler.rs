//! Tick-pumped timer queue.
//!
//! Every wait in the system (bench-sat confirmation, respawn settle) is a
//! [`TimerToken`] with a deadline and a continuation value. The owner pumps
//! the queue once per tick with [`TimerQueue::drain_due`] and dispatches the
//! returned continuations; nothing blocks.
//!
//! # Example Usage
//! ```rust,ignore
//! let mut timers = TimerQueue::new();
//! timers.schedule(Slot::RespawnSettle, now + Duration::from_secs(1), Task::Reposition);
//!
//! // in the per-tick callback
//! for task in timers.drain_due(now) {
//!     handle(task);
//! }
//! ```

use std::time::Instant;
use tracing::debug;

/// Handle to a scheduled continuation; used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct ScheduledTask<S, E> {
    token: TimerToken,
    slot: S,
    deadline: Instant,
    task: E,
}

/// Deadline-ordered continuations, at most one per logical slot.
#[derive(Debug)]
pub struct TimerQueue<S, E> {
    tasks: Vec<ScheduledTask<S, E>>,
    next_token: u64,
}

impl<S: PartialEq + std::fmt::Debug, E> TimerQueue<S, E> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_token: 0,
        }
    }

    /// Schedule `task` for `deadline`, cancelling whatever was pending in `slot`.
    pub fn schedule(&mut self, slot: S, deadline: Instant, task: E) -> TimerToken {
        if self.cancel_slot(&slot) {
            debug!(slot = ?slot, "Replaced pending timer");
        }
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.tasks.push(ScheduledTask {
            token,
            slot,
            deadline,
            task,
        });
        token
    }

    /// Cancel a specific timer. Returns false if it already fired or was replaced.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.token != token);
        self.tasks.len() != before
    }

    pub fn cancel_slot(&mut self, slot: &S) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.slot != slot);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, slot: &S) -> bool {
        self.tasks.iter().any(|t| &t.slot == slot)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.deadline).min()
    }

    /// Remove and return every continuation whose deadline is at or before `now`,
    /// earliest first (ties in scheduling order).
    pub fn drain_due(&mut self, now: Instant) -> Vec<E> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.tasks.len());
        for task in self.tasks.drain(..) {
            if task.deadline <= now {
                due.push(task);
            } else {
                pending.push(task);
            }
        }
        self.tasks = pending;
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.token.0.cmp(&b.token.0)));
        due.into_iter().map(|t| t.task).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl<S: PartialEq + std::fmt::Debug, E> Default for TimerQueue<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
