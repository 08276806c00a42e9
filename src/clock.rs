use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

/// Abstraction over "current time" to make behavior deterministic in tests.
///
/// The ledger records naive local wall-clock timestamps at second precision
/// (`YYYY-MM-DD HH:MM:SS`, no timezone), so that is what this trait hands out.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
