//! Booking service timestamps
//!
//! The booking service exchanges times as `YYYY/MM/DD HH:MM:00 +0000`.
//! Outbound values are always truncated to the minute and rendered in UTC.
//! Inbound values may carry seconds or another numeric offset; they are
//! normalized to UTC.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Outbound wire format. Seconds and offset are fixed literals.
const WIRE_FORMAT: &str = "%Y/%m/%d %H:%M:00 +0000";

/// Accepted inbound format.
const PARSE_FORMAT: &str = "%Y/%m/%d %H:%M:%S %z";

/// Errors from parsing a booking service timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("invalid booking timestamp {value:?}: {reason}")]
    Invalid { value: String, reason: String },
}

/// Render an instant in the booking service format.
pub fn format_service_timestamp(at: DateTime<Utc>) -> String {
    at.format(WIRE_FORMAT).to_string()
}

/// Parse a booking service timestamp into UTC.
pub fn parse_service_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_str(value.trim(), PARSE_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimestampError::Invalid {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(Duration::minutes(1)).unwrap_or(at)
}

/// Convert a std duration into a chrono duration, saturating on overflow.
pub fn to_chrono(duration: std::time::Duration) -> Duration {
    Duration::from_std(duration).unwrap_or(Duration::MAX)
}
