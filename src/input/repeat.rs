//! Held-key auto-repeat for menu navigation.

use std::time::{Duration, Instant};

/// Fires once on press, then again after `initial_delay`, then every `interval`
/// while the key stays down.
#[derive(Debug, Clone)]
pub struct RepeatGate {
    initial_delay: Duration,
    interval: Duration,
    next_fire: Option<Instant>,
}

impl RepeatGate {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            next_fire: None,
        }
    }

    /// Key went down. Always fires; a press while already held is ignored.
    pub fn press(&mut self, now: Instant) -> bool {
        if self.next_fire.is_some() {
            return false;
        }
        self.next_fire = Some(now + self.initial_delay);
        true
    }

    /// Number of repeat steps due since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_fire else {
            return 0;
        };
        let mut steps = 0;
        while now >= next {
            steps += 1;
            next += self.interval.max(Duration::from_millis(1));
        }
        self.next_fire = Some(next);
        steps
    }

    pub fn release(&mut self) {
        self.next_fire = None;
    }

    pub fn is_held(&self) -> bool {
        self.next_fire.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_delay_then_repeat() {
        let t0 = Instant::now();
        let mut gate = RepeatGate::new(ms(200), ms(80));

        assert!(gate.press(t0));
        assert_eq!(gate.poll(t0 + ms(199)), 0);
        assert_eq!(gate.poll(t0 + ms(200)), 1);
        assert_eq!(gate.poll(t0 + ms(279)), 0);
        assert_eq!(gate.poll(t0 + ms(280)), 1);
        // A long frame catches up
        assert_eq!(gate.poll(t0 + ms(520)), 3);
    }

    #[test]
    fn test_release_stops_repeat() {
        let t0 = Instant::now();
        let mut gate = RepeatGate::new(ms(200), ms(80));
        gate.press(t0);
        gate.release();
        assert!(!gate.is_held());
        assert_eq!(gate.poll(t0 + ms(1000)), 0);
        assert!(gate.press(t0 + ms(1000)));
    }

    #[test]
    fn test_repress_while_held_is_ignored() {
        let t0 = Instant::now();
        let mut gate = RepeatGate::new(ms(200), ms(80));
        assert!(gate.press(t0));
        assert!(!gate.press(t0 + ms(10)));
    }
}
