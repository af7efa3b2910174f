use chrono::{NaiveDateTime, Utc};

/// Source of the current instant.
///
/// Every temporal rule takes its notion of "now" from here, so the rules
/// can be exercised in tests without touching the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC. The service runs in a single implicit timezone;
/// instants are stored and compared as naive UTC datetimes throughout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Frozen clock for deterministic rule tests.
#[cfg(test)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
