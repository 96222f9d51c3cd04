//! Idle clock: time since the last qualifying insertion

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct IdleClock {
    last_insert_at: Instant,
}

impl IdleClock {
    /// Start the clock as if an insertion happened at `started_at`
    pub fn new(started_at: Instant) -> Self {
        Self {
            last_insert_at: started_at,
        }
    }

    /// Record a qualifying insertion
    ///
    /// Never moves backwards: a late-delivered event carrying an older
    /// timestamp leaves the clock untouched.
    pub fn record_insertion(&mut self, at: Instant) {
        if at > self.last_insert_at {
            self.last_insert_at = at;
        }
    }

    pub fn last_insert_at(&self) -> Instant {
        self.last_insert_at
    }

    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_insert_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_starts_at_zero() {
        let start = Instant::now();
        let clock = IdleClock::new(start);
        assert_eq!(clock.idle(start), Duration::ZERO);
        assert_eq!(clock.idle(start + Duration::from_millis(1500)), Duration::from_millis(1500));
    }

    #[test]
    fn test_insertion_resets_idle() {
        let start = Instant::now();
        let mut clock = IdleClock::new(start);

        clock.record_insertion(start + Duration::from_secs(3));
        assert_eq!(clock.idle(start + Duration::from_secs(4)), Duration::from_secs(1));
    }

    #[test]
    fn test_never_moves_backwards() {
        let start = Instant::now();
        let mut clock = IdleClock::new(start);

        clock.record_insertion(start + Duration::from_secs(5));
        clock.record_insertion(start + Duration::from_secs(2));
        assert_eq!(clock.last_insert_at(), start + Duration::from_secs(5));
    }

    #[test]
    fn test_idle_saturates_for_earlier_now() {
        let start = Instant::now();
        let mut clock = IdleClock::new(start);
        clock.record_insertion(start + Duration::from_secs(1));
        assert_eq!(clock.idle(start), Duration::ZERO);
    }
}
