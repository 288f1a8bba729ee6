//! Rate-limit governance from `X-RateLimit-*` response headers.
//!
//! Every response passes through [`RateGovernor::observe`]. When the
//! remaining quota is at or below the floor, the calling task sleeps until
//! the window resets before the next request can be issued.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use super::error::GitHubError;
use crate::http::{HttpHeaders, header_get};

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Remaining-quota threshold at or below which requests pause.
pub const DEFAULT_RATE_LIMIT_FLOOR: u64 = 50;

/// Reset values at or above this are epoch seconds, not a millisecond delay.
const EPOCH_SECONDS_THRESHOLD: u64 = 1_000_000_000;

/// Quota snapshot from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

impl RateLimit {
    /// Parse the three rate-limit headers; all are required.
    pub fn from_headers(headers: &HttpHeaders) -> Result<Self, GitHubError> {
        Ok(Self {
            limit: parse_header(headers, HEADER_LIMIT)?,
            remaining: parse_header(headers, HEADER_REMAINING)?,
            reset: parse_header(headers, HEADER_RESET)?,
        })
    }

    /// How long to wait before the quota window resets.
    pub fn reset_delay(&self) -> Duration {
        self.reset_delay_at(Utc::now())
    }

    fn reset_delay_at(&self, now: DateTime<Utc>) -> Duration {
        if self.reset < EPOCH_SECONDS_THRESHOLD {
            return Duration::from_millis(self.reset);
        }
        let now = u64::try_from(now.timestamp()).unwrap_or_default();
        Duration::from_secs(self.reset.saturating_sub(now))
    }
}

fn parse_header(headers: &HttpHeaders, name: &'static str) -> Result<u64, GitHubError> {
    let value = header_get(headers, name);
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| GitHubError::RateLimitHeader {
            header: name,
            value: value.map(str::to_string),
        })
}

/// Blocking backpressure on a single flow of requests.
#[derive(Debug, Clone, Copy)]
pub struct RateGovernor {
    floor: u64,
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_FLOOR)
    }
}

impl RateGovernor {
    pub fn new(floor: u64) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> u64 {
        self.floor
    }

    #[inline]
    pub fn needs_cooldown(&self, rate_limit: &RateLimit) -> bool {
        rate_limit.remaining <= self.floor
    }

    /// Check a response's headers, sleeping through the reset window if the
    /// quota is exhausted. Returns the parsed quota.
    pub async fn observe(&self, headers: &HttpHeaders) -> Result<RateLimit, GitHubError> {
        let rate_limit = RateLimit::from_headers(headers)?;

        if self.needs_cooldown(&rate_limit) {
            let delay = rate_limit.reset_delay();
            warn!(
                remaining = rate_limit.remaining,
                limit = rate_limit.limit,
                floor = self.floor,
                delay_secs = delay.as_secs_f64(),
                "Rate limit nearly exhausted, pausing until reset"
            );
            tokio::time::sleep(delay).await;
        } else {
            trace!(
                remaining = rate_limit.remaining,
                limit = rate_limit.limit,
                "Rate limit ok"
            );
        }

        Ok(rate_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::time::Instant;

    fn headers(limit: &str, remaining: &str, reset: &str) -> HttpHeaders {
        vec![
            ("X-RateLimit-Limit".to_string(), limit.to_string()),
            ("X-RateLimit-Remaining".to_string(), remaining.to_string()),
            ("X-RateLimit-Reset".to_string(), reset.to_string()),
        ]
    }

    #[test]
    fn parses_all_three_headers() {
        let rl = RateLimit::from_headers(&headers("5000", "4999", "1500")).unwrap();
        assert_eq!(
            rl,
            RateLimit {
                limit: 5000,
                remaining: 4999,
                reset: 1500
            }
        );
    }

    #[test]
    fn missing_header_is_an_error() {
        let mut h = headers("5000", "4999", "1500");
        h.remove(1);
        let err = RateLimit::from_headers(&h).unwrap_err();
        assert!(matches!(
            err,
            GitHubError::RateLimitHeader {
                header: HEADER_REMAINING,
                value: None
            }
        ));
    }

    #[test]
    fn non_numeric_header_is_an_error() {
        let err = RateLimit::from_headers(&headers("5000", "4999", "soon")).unwrap_err();
        match err {
            GitHubError::RateLimitHeader { header, value } => {
                assert_eq!(header, HEADER_RESET);
                assert_eq!(value.as_deref(), Some("soon"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn small_reset_values_are_millisecond_delays() {
        let rl = RateLimit {
            limit: 5000,
            remaining: 0,
            reset: 1500,
        };
        assert_eq!(rl.reset_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn epoch_reset_values_count_down_from_now() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let future = RateLimit {
            limit: 5000,
            remaining: 0,
            reset: 1_700_000_090,
        };
        assert_eq!(future.reset_delay_at(now), Duration::from_secs(90));

        let past = RateLimit {
            reset: 1_699_999_000,
            ..future
        };
        assert_eq!(past.reset_delay_at(now), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_for_reset_delay_at_or_below_floor() {
        let governor = RateGovernor::default();
        let start = Instant::now();

        let rl = governor.observe(&headers("5000", "50", "1500")).await.unwrap();

        assert_eq!(rl.remaining, 50);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_sleep_above_floor() {
        let governor = RateGovernor::default();
        let start = Instant::now();

        governor.observe(&headers("5000", "51", "60000")).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_floor_is_respected() {
        let governor = RateGovernor::new(0);
        assert_eq!(governor.floor(), 0);
        let start = Instant::now();

        governor.observe(&headers("5000", "1", "60000")).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));

        governor.observe(&headers("5000", "0", "250")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
