use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current instant. Attendance dates are checked against
/// `today()`, so handlers receive the clock as injected app data.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    pub fn at(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(9, 0, 0).unwrap().and_utc())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
