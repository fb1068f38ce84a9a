//! Daily wall-clock run times for the watch loop.

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDateTime, NaiveTime};

pub const DEFAULT_TIMES: &str = "09:00,21:00";

/// A set of times of day at which a job is due, every day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    times: Vec<NaiveTime>,
}

impl DailySchedule {
    /// Parses a comma-separated list of `HH:MM` times.
    pub fn parse(times: &str) -> Result<Self> {
        let mut parsed = times
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveTime::parse_from_str(s, "%H:%M")
                    .with_context(|| format!("Invalid time {s:?}, expected HH:MM"))
            })
            .collect::<Result<Vec<_>>>()?;
        if parsed.is_empty() {
            bail!("Schedule needs at least one time");
        }
        parsed.sort();
        parsed.dedup();
        Ok(Self { times: parsed })
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// The first scheduled instant strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        self.times
            .iter()
            .map(|t| today.and_time(*t))
            .find(|due| *due > now)
            .unwrap_or_else(|| (today + Duration::days(1)).and_time(self.times[0]))
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self {
            times: vec![
                NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
                NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_sorts_and_dedups() {
        let schedule = DailySchedule::parse("21:00, 09:00,21:00").unwrap();
        assert_eq!(schedule, DailySchedule::default());
        assert_eq!(DailySchedule::parse(DEFAULT_TIMES).unwrap(), DailySchedule::default());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(DailySchedule::parse("").is_err());
        assert!(DailySchedule::parse("9am").is_err());
        assert!(DailySchedule::parse("25:00").is_err());
    }

    #[test]
    fn test_next_after_same_day() {
        let schedule = DailySchedule::default();
        assert_eq!(schedule.next_after(at(5, 8, 30)), at(5, 9, 0));
        assert_eq!(schedule.next_after(at(5, 9, 0)), at(5, 21, 0));
    }

    #[test]
    fn test_next_after_wraps_past_midnight() {
        let schedule = DailySchedule::default();
        assert_eq!(schedule.next_after(at(5, 21, 0)), at(6, 9, 0));
        let april_first = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(schedule.next_after(at(31, 23, 59)), april_first);
    }
}
