//! Step count aggregation over calendar days and hours.
//!
//! ## Example
//! ```rust
//! use chrono::NaiveDate;
//! use health_aggregator::steps::aggregate_daily_steps;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
//! let days = aggregate_daily_steps(start, end, |window| {
//!     Ok(if window.start.date() == start { 500 } else { 0 })
//! })
//! .unwrap();
//! assert_eq!(days.len(), 1);
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::debug;

use crate::error::Result;
use crate::types::{DailyStepRecord, HourlyStepRecord, TimeWindow};

/// Offset from midnight to the last covered second of a day (23:59:59).
const DAY_END_OFFSET_SECS: i64 = 24 * 60 * 60 - 1;

/// Offset from the top of an hour to its last covered second (hh:59:59).
const HOUR_END_OFFSET_SECS: i64 = 60 * 60 - 1;

const HOURS_PER_DAY: u32 = 24;

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Window covering `date` from 00:00:00 to 23:59:59.
///
/// The end is one second before midnight, not the next midnight. Sources
/// treat the end as inclusive, so this boundary must not change.
pub fn day_window(date: NaiveDate) -> TimeWindow {
    let start = start_of_day(date);
    TimeWindow::new(start, start + Duration::seconds(DAY_END_OFFSET_SECS))
}

/// Window from the start of `start` to 23:59:59 on `end`.
pub fn range_window(start: NaiveDate, end: NaiveDate) -> TimeWindow {
    TimeWindow::new(start_of_day(start), day_window(end).end)
}

/// Window from the start of today up to `now`.
pub fn today_window(now: NaiveDateTime) -> TimeWindow {
    TimeWindow::new(start_of_day(now.date()), now)
}

/// Window covering `hour` (0-23) of `date`, ending at hh:59:59.
pub fn hour_window(date: NaiveDate, hour: u32) -> TimeWindow {
    let start = start_of_day(date) + Duration::hours(i64::from(hour));
    TimeWindow::new(start, start + Duration::seconds(HOUR_END_OFFSET_SECS))
}

/// Sum steps per calendar day from `start` to `end`, both inclusive.
///
/// `query_day` is called once per day with that day's [`day_window`]. Days
/// with a zero total are left out, so the result is ascending by date with
/// at most one record per day. A reversed range yields an empty result.
///
/// The first failing day aborts the whole range; no partial result is
/// returned.
pub fn aggregate_daily_steps<F>(
    start: NaiveDate,
    end: NaiveDate,
    mut query_day: F,
) -> Result<Vec<DailyStepRecord>>
where
    F: FnMut(&TimeWindow) -> Result<u64>,
{
    let mut records = Vec::new();

    for date in start.iter_days().take_while(|date| *date <= end) {
        let window = day_window(date);
        let step_count = query_day(&window)?;
        debug!("[Steps] {}: {} steps", date, step_count);

        if step_count > 0 {
            records.push(DailyStepRecord { date, step_count });
        }
    }

    Ok(records)
}

/// Sum steps per hour of `date`, skipping empty hours.
///
/// When `date` is the day of `now`, hours after the current one are not
/// queried. Dates after `now` yield nothing.
pub fn aggregate_hourly_steps<F>(
    date: NaiveDate,
    now: NaiveDateTime,
    mut query_hour: F,
) -> Result<Vec<HourlyStepRecord>>
where
    F: FnMut(&TimeWindow) -> Result<u64>,
{
    let last_hour = match date.cmp(&now.date()) {
        std::cmp::Ordering::Less => HOURS_PER_DAY - 1,
        std::cmp::Ordering::Equal => now.hour(),
        std::cmp::Ordering::Greater => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for hour in 0..=last_hour {
        let step_count = query_hour(&hour_window(date, hour))?;
        if step_count > 0 {
            records.push(HourlyStepRecord { hour, step_count });
        }
    }

    debug!(
        "[Steps] {}: {} hours with steps (through hour {})",
        date,
        records.len(),
        last_hour
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HealthError;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn counts(pairs: &[(NaiveDate, u64)]) -> HashMap<NaiveDate, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_skips_zero_days() {
        let table = counts(&[
            (date(2024, 1, 1), 500),
            (date(2024, 1, 2), 0),
            (date(2024, 1, 3), 1200),
        ]);
        let result = aggregate_daily_steps(date(2024, 1, 1), date(2024, 1, 3), |w| {
            Ok(table[&w.start.date()])
        })
        .unwrap();

        assert_eq!(
            result,
            vec![
                DailyStepRecord {
                    date: date(2024, 1, 1),
                    step_count: 500
                },
                DailyStepRecord {
                    date: date(2024, 1, 3),
                    step_count: 1200
                },
            ]
        );
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let mut calls = 0;
        let result = aggregate_daily_steps(date(2024, 1, 5), date(2024, 1, 1), |_| {
            calls += 1;
            Ok(100)
        })
        .unwrap();
        assert!(result.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_all_zero_is_empty() {
        let result =
            aggregate_daily_steps(date(2024, 1, 1), date(2024, 1, 31), |_| Ok(0)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_day_range() {
        let result =
            aggregate_daily_steps(date(2024, 2, 29), date(2024, 2, 29), |_| Ok(42)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].date, date(2024, 2, 29));
    }

    #[test]
    fn test_visits_each_day_once_in_order() {
        let mut seen = Vec::new();
        let result = aggregate_daily_steps(date(2023, 12, 30), date(2024, 1, 2), |w| {
            seen.push(w.start.date());
            Ok(1)
        })
        .unwrap();

        let expected = vec![
            date(2023, 12, 30),
            date(2023, 12, 31),
            date(2024, 1, 1),
            date(2024, 1, 2),
        ];
        assert_eq!(seen, expected);
        let dates: Vec<_> = result.iter().map(|r| r.date).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_failure_aborts_range() {
        let mut calls = 0;
        let result = aggregate_daily_steps(date(2024, 1, 1), date(2024, 1, 10), |w| {
            calls += 1;
            if w.start.date() == date(2024, 1, 3) {
                Err(HealthError::data_access("store closed"))
            } else {
                Ok(100)
            }
        });
        assert!(matches!(result, Err(HealthError::DataAccess { .. })));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_day_window_ends_one_second_before_midnight() {
        let w = day_window(date(2024, 1, 1));
        assert_eq!(w.start.to_string(), "2024-01-01 00:00:00");
        assert_eq!(w.end.to_string(), "2024-01-01 23:59:59");
    }

    #[test]
    fn test_range_window_spans_both_ends() {
        let w = range_window(date(2024, 1, 1), date(2024, 1, 7));
        assert_eq!(w.start.to_string(), "2024-01-01 00:00:00");
        assert_eq!(w.end.to_string(), "2024-01-07 23:59:59");
    }

    #[test]
    fn test_hour_window() {
        let w = hour_window(date(2024, 1, 1), 13);
        assert_eq!(w.start.to_string(), "2024-01-01 13:00:00");
        assert_eq!(w.end.to_string(), "2024-01-01 13:59:59");
    }

    #[test]
    fn test_hourly_stops_at_current_hour() {
        let now = date(2024, 1, 1).and_hms_opt(9, 30, 0).unwrap();
        let mut hours = Vec::new();
        let result = aggregate_hourly_steps(date(2024, 1, 1), now, |w| {
            let hour = w.start.hour();
            hours.push(hour);
            Ok(if hour % 2 == 0 { 10 } else { 0 })
        })
        .unwrap();

        assert_eq!(hours, (0..=9).collect::<Vec<_>>());
        let with_steps: Vec<_> = result.iter().map(|r| r.hour).collect();
        assert_eq!(with_steps, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_hourly_past_day_covers_all_hours() {
        let now = date(2024, 1, 2).and_hms_opt(1, 0, 0).unwrap();
        let result = aggregate_hourly_steps(date(2024, 1, 1), now, |_| Ok(1)).unwrap();
        assert_eq!(result.len(), 24);
        assert_eq!(result.last().map(|r| r.hour), Some(23));
    }

    #[test]
    fn test_hourly_future_day_is_empty() {
        let now = date(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        let result = aggregate_hourly_steps(date(2024, 1, 2), now, |_| Ok(1)).unwrap();
        assert!(result.is_empty());
    }
}
