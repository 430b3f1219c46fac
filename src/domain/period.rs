use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Inclusive time window. All boundaries are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Builds a period, swapping the bounds when they arrive reversed.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Whole UTC days from the first to the last date, both included.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Self {
        let start = first.and_time(NaiveTime::MIN).and_utc();
        let end = end_of_day(last);
        Self::new(start, end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn contains_opt(&self, instant: Option<DateTime<Utc>>) -> bool {
        instant.is_some_and(|value| self.contains(value))
    }

    /// The period of equal length that ends 1 ms before this one starts.
    pub fn preceding(&self) -> Self {
        let end = self.start - Duration::milliseconds(1);
        let start = self.start - self.duration();
        Self::new(start, end)
    }
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    start + Duration::days(1) - Duration::milliseconds(1)
}
