//! Re-armable periodic tasks for the single-threaded main loop.
//!
//! Each cadence is an explicit, inspectable timer: armed or not, and when
//! armed, the instant it is next due. Firing re-arms it one period after
//! the moment it was polled, like a timeout re-set at the end of its own
//! handler, so a late poll delays the next firing instead of bunching them.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Cadence {
    period: Duration,
    next_due: Option<Instant>,
}

impl Cadence {
    pub fn new(period: Duration) -> Self {
        Self { period, next_due: None }
    }

    /// Due immediately.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arm if `active` and not yet armed, disarm if not `active`.
    pub fn set_active(&mut self, active: bool, now: Instant) {
        match (active, self.is_armed()) {
            (true, false) => self.arm(now),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// True if the task is due; the next firing is then `now + period`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next firing, zero if overdue, `None` if disarmed.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

/// Shortest wait across `cadences`, capped at `max`.
pub fn next_timeout(cadences: &[&Cadence], now: Instant, max: Duration) -> Duration {
    cadences
        .iter()
        .filter_map(|c| c.time_until(now))
        .fold(max, Duration::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn disarmed_cadence_never_fires() {
        let t0 = Instant::now();
        let mut c = Cadence::new(25 * MS);
        assert!(!c.poll(t0 + 1000 * MS));
        assert_eq!(c.time_until(t0), None);
    }

    #[test]
    fn fires_then_rearms_after_period() {
        let t0 = Instant::now();
        let mut c = Cadence::new(25 * MS);
        c.arm(t0);
        assert!(c.poll(t0));
        assert!(!c.poll(t0 + 24 * MS));
        assert!(c.poll(t0 + 25 * MS));
        assert_eq!(c.time_until(t0 + 30 * MS), Some(20 * MS));
    }

    #[test]
    fn late_poll_fires_once_and_pushes_next_due() {
        let t0 = Instant::now();
        let mut c = Cadence::new(25 * MS);
        c.arm(t0);
        assert!(c.poll(t0 + 500 * MS));
        assert!(!c.poll(t0 + 510 * MS));
        assert!(c.poll(t0 + 525 * MS));
    }

    #[test]
    fn set_active_toggles_armed_state() {
        let t0 = Instant::now();
        let mut c = Cadence::new(25 * MS);
        c.set_active(true, t0);
        assert!(c.is_armed());
        c.poll(t0);
        // staying active keeps the pending due time
        c.set_active(true, t0 + MS);
        assert_eq!(c.time_until(t0 + MS), Some(24 * MS));
        c.set_active(false, t0 + 2 * MS);
        assert!(!c.is_armed());
    }

    #[test]
    fn next_timeout_picks_soonest() {
        let t0 = Instant::now();
        let mut a = Cadence::new(25 * MS);
        let mut b = Cadence::new(16 * MS);
        let idle = Cadence::new(MS);
        a.arm(t0);
        b.arm(t0);
        a.poll(t0);
        b.poll(t0);
        assert_eq!(next_timeout(&[&a, &b, &idle], t0, 100 * MS), 16 * MS);
        assert_eq!(next_timeout(&[&idle], t0, 100 * MS), 100 * MS);
    }
}
