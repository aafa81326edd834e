//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the on-site booking domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::{BookingId, CheckinToken, MembershipId};
use chrono::{DateTime, Duration, Utc};

/// A reservation of the resource, owned by the remote booking service.
///
/// The service guarantees at most one active booking per resource at any
/// instant; the controller relies on that rather than enforcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Remote identifier
    pub id: BookingId,
    /// Member holding the reservation
    pub membership_id: MembershipId,
    /// Start of the reservation window
    pub start_time: DateTime<Utc>,
    /// End of the reservation window (exclusive)
    pub end_time: DateTime<Utc>,
    pub title: String,
    /// Free text for attribution, never parsed
    pub comments: String,
}

impl Booking {
    /// Whether the booking window has passed at `now`.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// Whether `membership_id` holds this booking.
    pub fn is_held_by(&self, membership_id: &MembershipId) -> bool {
        &self.membership_id == membership_id
    }

    /// Time elapsed since the booking started (negative if it starts later).
    pub fn elapsed_since_start(&self, now: DateTime<Utc>) -> Duration {
        now - self.start_time
    }
}

/// Request for a new booking made on site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub membership_id: MembershipId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub comments: String,
}

impl BookingRequest {
    /// Build a request for a booking starting at `start` and lasting `duration`.
    pub fn starting_at(
        membership_id: MembershipId,
        start: DateTime<Utc>,
        duration: Duration,
        title: impl Into<String>,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            membership_id,
            start_time: start,
            end_time: start + duration,
            title: title.into(),
            comments: comments.into(),
        }
    }
}

/// A badge resolved to a membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub checkin_token: CheckinToken,
    pub membership_id: MembershipId,
}

impl Identity {
    pub fn new(checkin_token: CheckinToken, membership_id: MembershipId) -> Self {
        Self {
            checkin_token,
            membership_id,
        }
    }
}
