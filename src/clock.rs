use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Abstraction over "current time" to make behavior deterministic in tests.
///
/// Transaction dates default to `today()` when the classifier does not
/// extract one, so everything that touches dates takes a `Clock`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Pin the clock to noon UTC on the given calendar day.
    pub fn on_date(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).expect("valid time of day");
        Self {
            now: Utc.from_utc_datetime(&noon),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
