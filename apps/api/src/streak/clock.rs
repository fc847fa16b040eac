use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now". Injected through `AppState` so tests can pin the date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for streak bookkeeping. Always UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the host system clock.
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
    pub fn at(date: &str, hour: u32) -> Self {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Self(date.and_hms_opt(hour, 0, 0).unwrap().and_utc())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_utc_date_of_now() {
        let clock = FixedClock::at("2024-06-30", 23);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }
}
