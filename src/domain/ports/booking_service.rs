//! Booking Service Port
//!
//! Defines the interface to the remote booking service: identity lookup and
//! reservation CRUD for the guarded resource.

use crate::domain::entities::{Booking, BookingRequest};
use crate::domain::value_objects::{BookingField, BookingId, CheckinToken, MembershipId, ResourceId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Failures reported by the booking service.
///
/// The reconciler treats every variant as "no success": it never changes
/// state on a failed call, whatever the cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Network failure or timeout.
    #[error("booking service unavailable: {0}")]
    Unavailable(String),
    /// Non-success status, including validation failures.
    #[error("booking service rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The booking is owned by another channel and cannot be changed here.
    #[error("booking conflict: {0}")]
    Conflict(String),
    /// The lookup returned no usable membership id.
    #[error("no membership for check-in token {0}")]
    InvalidIdentity(String),
    /// The response body could not be decoded.
    #[error("malformed booking service response: {0}")]
    Malformed(String),
}

/// Remote booking service.
///
/// This is an outbound port. The credential lives inside the implementation;
/// callers only name the resource and the records they act on.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Resolve a check-in token to the membership that owns the badge.
    async fn lookup_identity(&self, token: &CheckinToken) -> Result<MembershipId, ServiceError>;

    /// The booking currently holding the resource, if any.
    async fn get_current_booking(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Option<Booking>, ServiceError>;

    /// All bookings of the resource overlapping `[from, to)`.
    async fn get_bookings_in_range(
        &self,
        resource_id: &ResourceId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, ServiceError>;

    /// Create a booking of the resource.
    async fn create_booking(
        &self,
        resource_id: &ResourceId,
        request: &BookingRequest,
    ) -> Result<Booking, ServiceError>;

    /// Move the start or end of a booking.
    async fn update_booking(
        &self,
        booking_id: &BookingId,
        field: BookingField,
        value: DateTime<Utc>,
    ) -> Result<Booking, ServiceError>;

    /// Delete a booking. Fails with `Conflict` for bookings owned by another
    /// channel (e.g. a scheduled event).
    async fn delete_booking(&self, booking_id: &BookingId) -> Result<(), ServiceError>;
}
