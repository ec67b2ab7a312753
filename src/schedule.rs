//! Order schedule

use jiff::civil::{Date, Time};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Errors parsing a schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The date was not a valid `yyyy-MM-dd` date.
    #[error("invalid date {0:?}, expected yyyy-MM-dd")]
    InvalidDate(String),

    /// The time was not a valid `HH:mm` time.
    #[error("invalid time {0:?}, expected HH:mm")]
    InvalidTime(String),
}

/// Requested visit date and time. Either part may be left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schedule {
    date: Option<Date>,
    time: Option<Time>,
}

impl Schedule {
    /// Create a schedule from already parsed parts.
    pub fn new(date: Option<Date>, time: Option<Time>) -> Self {
        Self { date, time }
    }

    /// Parse a schedule from its wire strings. Blank strings mean "not set".
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] naming the part that failed to parse.
    pub fn parse(date: &str, time: &str) -> Result<Self, ScheduleError> {
        let date = match date.trim() {
            "" => None,
            value => Some(
                Date::strptime(DATE_FORMAT, value)
                    .map_err(|_error| ScheduleError::InvalidDate(value.to_string()))?,
            ),
        };

        let time = match time.trim() {
            "" => None,
            value => Some(
                Time::strptime(TIME_FORMAT, value)
                    .map_err(|_error| ScheduleError::InvalidTime(value.to_string()))?,
            ),
        };

        Ok(Self { date, time })
    }

    /// Requested date.
    pub fn date(&self) -> Option<Date> {
        self.date
    }

    /// Requested time.
    pub fn time(&self) -> Option<Time> {
        self.time
    }

    /// The date as `yyyy-MM-dd`, or an empty string.
    pub fn date_string(&self) -> String {
        self.date
            .map(|date| date.strftime(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// The time as `HH:mm`, or an empty string.
    pub fn time_string(&self) -> String {
        self.time
            .map(|time| time.strftime(TIME_FORMAT).to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_formats_round_trip_to_wire_strings() -> TestResult {
        let schedule = Schedule::parse("2025-06-16", "09:30")?;

        assert_eq!(schedule.date(), Some(date(2025, 6, 16)));
        assert_eq!(schedule.time(), Some(time(9, 30, 0, 0)));
        assert_eq!(schedule.date_string(), "2025-06-16");
        assert_eq!(schedule.time_string(), "09:30");

        Ok(())
    }

    #[test]
    fn blank_parts_are_unset() -> TestResult {
        let schedule = Schedule::parse("", "  ")?;

        assert_eq!(schedule, Schedule::default());
        assert_eq!(schedule.date_string(), "");
        assert_eq!(schedule.time_string(), "");

        Ok(())
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert_eq!(
            Schedule::parse("2025-02-30", ""),
            Err(ScheduleError::InvalidDate("2025-02-30".to_string()))
        );
    }

    #[test]
    fn invalid_time_is_rejected() {
        assert_eq!(
            Schedule::parse("", "25:00"),
            Err(ScheduleError::InvalidTime("25:00".to_string()))
        );
    }
}
