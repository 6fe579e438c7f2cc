// Expiry evaluation

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use super::types::RawExpiry;

/// Tokens expiring within this window are refreshed ahead of time
pub const EXPIRY_BUFFER_MINUTES: i64 = 60;

/// Result of evaluating an expiry value against the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Outside the buffer window
    Valid,
    /// Still valid, but inside the buffer window
    ExpiringSoon,
    /// Already past the expiry instant
    Expired,
    /// Could not be normalized to an instant
    Unparseable,
}

impl ExpiryStatus {
    /// Whether this status calls for a refresh
    pub fn needs_refresh(self) -> bool {
        !matches!(self, ExpiryStatus::Valid)
    }
}

/// Normalize a raw expiry into an absolute instant.
///
/// Numbers are epoch milliseconds. Strings are tried as an integer
/// (milliseconds), then RFC 3339, ISO 8601 without offset (UTC assumed),
/// a plain date (midnight UTC) and finally RFC 2822.
pub fn normalize(raw: &RawExpiry) -> Option<DateTime<Utc>> {
    match raw {
        RawExpiry::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        RawExpiry::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(ms) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Evaluate an expiry value at the given instant
pub fn evaluate(raw: &RawExpiry, now: DateTime<Utc>) -> ExpiryStatus {
    let Some(expires_at) = normalize(raw) else {
        return ExpiryStatus::Unparseable;
    };

    if now >= expires_at {
        return ExpiryStatus::Expired;
    }

    match expires_at.checked_sub_signed(Duration::minutes(EXPIRY_BUFFER_MINUTES)) {
        Some(threshold) if now < threshold => ExpiryStatus::Valid,
        _ => ExpiryStatus::ExpiringSoon,
    }
}

/// Evaluate and log the expiry status at the given instant.
/// An unparseable value logs exactly one warning.
pub fn check(raw: &RawExpiry, now: DateTime<Utc>) -> ExpiryStatus {
    let status = evaluate(raw, now);

    match status {
        ExpiryStatus::Unparseable => {
            tracing::warn!(
                "Could not parse token expiry '{}', treating token as expired",
                raw
            );
        }
        ExpiryStatus::Expired => {
            tracing::info!("Token has expired");
        }
        ExpiryStatus::ExpiringSoon => {
            tracing::info!(
                "Token expires within {} minutes, refreshing early",
                EXPIRY_BUFFER_MINUTES
            );
        }
        ExpiryStatus::Valid => {
            if let Some(exp) = normalize(raw) {
                tracing::debug!("Token valid until {}", exp.to_rfc3339());
            }
        }
    }

    status
}

/// Check whether the token needs refreshing at the given instant.
/// Unparseable values count as expired so that a refresh is attempted.
pub fn is_expired_at(raw: &RawExpiry, now: DateTime<Utc>) -> bool {
    check(raw, now).needs_refresh()
}

/// Check whether the token needs refreshing now
pub fn is_expired(raw: &RawExpiry) -> bool {
    is_expired_at(raw, Utc::now())
}
