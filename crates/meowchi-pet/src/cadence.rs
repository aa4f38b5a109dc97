//! Fixed-period timers driven by an external clock.
//!
//! A [`Cadence`] never reads the wall clock itself. Callers pass `now` to
//! [`Cadence::due`], which reports how many periods elapsed since the last
//! call. This keeps every component deterministic under a manual clock.

use chrono::{DateTime, TimeDelta, Utc};

/// Upper bound on periods reported by a single [`Cadence::due`] call.
///
/// After a long suspension the cadence catches up this many periods and then
/// re-anchors on `now` instead of replaying the whole gap.
pub const MAX_CATCH_UP: u32 = 64;

/// A repeating deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period: TimeDelta,
    next_due: DateTime<Utc>,
}

impl Cadence {
    /// Create a cadence whose first deadline is one period after `now`.
    ///
    /// Non-positive periods are raised to one millisecond.
    pub fn new(period: TimeDelta, now: DateTime<Utc>) -> Self {
        let period = period.max(TimeDelta::milliseconds(1));
        Self {
            period,
            next_due: advance(now, period),
        }
    }

    /// Period between deadlines.
    pub const fn period(&self) -> TimeDelta {
        self.period
    }

    /// Next deadline.
    pub const fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// Number of deadlines passed at `now`, advancing past each of them.
    pub fn due(&mut self, now: DateTime<Utc>) -> u32 {
        let mut fired: u32 = 0;
        while now >= self.next_due && fired < MAX_CATCH_UP {
            fired = fired.saturating_add(1);
            self.next_due = advance(self.next_due, self.period);
        }
        if now >= self.next_due {
            self.next_due = advance(now, self.period);
        }
        fired
    }

    /// Restart the cadence so the next deadline is one period after `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.next_due = advance(now, self.period);
    }
}

fn advance(from: DateTime<Utc>, period: TimeDelta) -> DateTime<Utc> {
    from.checked_add_signed(period).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn nothing_is_due_before_the_first_period() {
        let mut cadence = Cadence::new(TimeDelta::seconds(60), at(0));
        assert_eq!(cadence.due(at(59)), 0);
        assert_eq!(cadence.due(at(60)), 1);
        assert_eq!(cadence.due(at(61)), 0);
        assert_eq!(cadence.next_due(), at(120));
    }

    #[test]
    fn missed_periods_are_reported_together() {
        let mut cadence = Cadence::new(TimeDelta::seconds(10), at(0));
        assert_eq!(cadence.due(at(35)), 3);
        assert_eq!(cadence.next_due(), at(40));
    }

    #[test]
    fn long_gaps_are_capped_and_reanchored() {
        let mut cadence = Cadence::new(TimeDelta::seconds(1), at(0));
        assert_eq!(cadence.due(at(10_000)), MAX_CATCH_UP);
        assert_eq!(cadence.next_due(), at(10_001));
    }

    #[test]
    fn zero_period_is_raised() {
        let cadence = Cadence::new(TimeDelta::zero(), at(0));
        assert_eq!(cadence.period(), TimeDelta::milliseconds(1));
    }

    #[test]
    fn reset_pushes_the_deadline() {
        let mut cadence = Cadence::new(TimeDelta::seconds(10), at(0));
        cadence.reset(at(7));
        assert_eq!(cadence.due(at(10)), 0);
        assert_eq!(cadence.due(at(17)), 1);
    }
}
