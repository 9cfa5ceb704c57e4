use chrono::{DateTime, Utc};
use std::time::Duration;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Time left before a token expiring at `expires_at` should be renewed.
///
/// Renewal is due `safety_margin_seconds` before expiry. A deadline already
/// in the past yields `Duration::ZERO`, never a negative wait.
pub fn renewal_delay(expires_at: i64, now: i64, safety_margin_seconds: u64) -> Duration {
    let margin = i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX);
    let remaining = expires_at.saturating_sub(margin).saturating_sub(now);
    if remaining <= 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(remaining as u64)
    }
}

/// Human readable form of a unix timestamp for logs
pub fn display_ts(unix_ts: i64) -> String {
    DateTime::from_timestamp(unix_ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| unix_ts.to_string())
}
