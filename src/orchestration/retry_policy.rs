//! # Retry & Backoff Policy
//!
//! Decides whether a failed execution gets another attempt and when. Delay
//! grows exponentially with the retry count, with bounded random jitter to
//! avoid thundering-herd retries, and is capped regardless of count. Old
//! schedules are never silently retried forever.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::RetryConfig;
use crate::models::ExecutionSchedule;

#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Whether the schedule is still eligible for another attempt.
    ///
    /// True iff the retry count is under the bound and the schedule is not
    /// older than the age window.
    pub fn should_retry(&self, schedule: &ExecutionSchedule, now: DateTime<Utc>) -> bool {
        schedule.retry_count() < self.config.max_retries
            && schedule.age(now) <= Duration::hours(i64::from(self.config.max_schedule_age_hours))
    }

    /// Delay before the given retry, without jitter: base × 2^(count-1),
    /// capped. The first retry (count 1) waits the base delay.
    fn exponential_delay_minutes(&self, retry_count: u32) -> u64 {
        let exponent = retry_count.saturating_sub(1).min(16);
        let scaled = u64::from(self.config.base_delay_minutes) << exponent;
        scaled.min(u64::from(self.config.max_delay_minutes))
    }

    /// The instant at which the retry should fire.
    pub fn calculate_retry_time(&self, retry_count: u32, now: DateTime<Utc>) -> DateTime<Utc> {
        let base_seconds = self.exponential_delay_minutes(retry_count) * 60;
        let max_jitter_seconds = u64::from(self.config.max_jitter_minutes) * 60;
        let jitter_seconds = if max_jitter_seconds == 0 {
            0
        } else {
            rand::rng().random_range(0..=max_jitter_seconds)
        };

        let cap_seconds = u64::from(self.config.max_delay_minutes) * 60;
        let total_seconds = (base_seconds + jitter_seconds).min(cap_seconds);

        now + Duration::seconds(total_seconds as i64)
    }
}
