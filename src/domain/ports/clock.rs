//! Clock Port
//!
//! Defines the interface for reading wall-clock time.

use chrono::{DateTime, Utc};

/// Source of wall-clock time for the controller.
///
/// The device clock is synchronized to UTC during network bootstrap, so a
/// single UTC clock drives both the booking timestamps and the local timers.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}
