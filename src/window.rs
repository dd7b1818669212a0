//! # Execution Window Evaluator
//!
//! Pure time-window arithmetic over a schedule's execution rules. Decides
//! whether a given instant falls inside the allowed hour-of-day/day-of-week
//! range in the schedule's timezone, and finds the next instant that does.
//! No I/O, deterministic under an injected clock.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::models::ExecutionRules;

/// How far ahead `next_window_start` searches before giving up.
const SEARCH_HORIZON_HOURS: i64 = 14 * 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid hour in execution rules: {0}")]
    InvalidHour(u8),

    #[error("No upcoming execution window within {SEARCH_HORIZON_HOURS} hours")]
    NoUpcomingWindow,
}

fn parse_timezone(rules: &ExecutionRules) -> Result<Tz, WindowError> {
    rules
        .timezone
        .parse()
        .map_err(|_| WindowError::InvalidTimezone(rules.timezone.clone()))
}

fn validate_hours(rules: &ExecutionRules) -> Result<(), WindowError> {
    for hour in [rules.start_hour, rules.end_hour] {
        if hour > 23 {
            return Err(WindowError::InvalidHour(hour));
        }
    }
    Ok(())
}

fn hour_in_range(hour: u8, start: u8, end: u8) -> bool {
    match start.cmp(&end) {
        // end == start means a 24h window
        std::cmp::Ordering::Equal => true,
        std::cmp::Ordering::Less => start <= hour && hour < end,
        // Window spans midnight
        std::cmp::Ordering::Greater => hour >= start || hour < end,
    }
}

/// Whether `now` falls inside the schedule's execution window.
pub fn in_window(rules: &ExecutionRules, now: DateTime<Utc>) -> Result<bool, WindowError> {
    validate_hours(rules)?;
    let tz = parse_timezone(rules)?;
    let local = now.with_timezone(&tz);

    let weekday = local.weekday().number_from_monday() as u8;
    if !rules.days_of_week.contains(&weekday) {
        return Ok(false);
    }

    Ok(hour_in_range(
        local.hour() as u8,
        rules.start_hour,
        rules.end_hour,
    ))
}

/// Soonest instant at or after `now` satisfying `in_window`.
///
/// Windows are hour-granular in local time, so when `now` itself is outside
/// the window the answer is a local hour boundary. DST gaps are skipped and
/// ambiguous local times resolve to their earlier occurrence.
pub fn next_window_start(
    rules: &ExecutionRules,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, WindowError> {
    if in_window(rules, now)? {
        return Ok(now);
    }

    let tz = parse_timezone(rules)?;
    let local_hour_start = now
        .with_timezone(&tz)
        .naive_local()
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or(WindowError::NoUpcomingWindow)?;

    for offset in 1..=SEARCH_HORIZON_HOURS {
        let candidate_naive = local_hour_start + Duration::hours(offset);
        // Nonexistent local times (DST spring-forward) are skipped entirely
        let Some(candidate_local) = tz.from_local_datetime(&candidate_naive).earliest() else {
            continue;
        };
        let candidate = candidate_local.with_timezone(&Utc);
        if candidate <= now {
            continue;
        }
        if in_window(rules, candidate)? {
            return Ok(candidate);
        }
    }

    Err(WindowError::NoUpcomingWindow)
}
