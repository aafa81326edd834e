//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::Serialize;
use std::fmt;

/// Decimal token the booking service uses to look up a badge.
///
/// Derived from the badge UID: the low 32 bits of the UID bytes read as a
/// little-endian integer, rendered in decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckinToken(String);

impl CheckinToken {
    /// Derive the check-in token from a raw badge UID.
    ///
    /// # Examples
    /// ```
    /// use onsite_booking::domain::value_objects::CheckinToken;
    ///
    /// let uid = [0x04, 0x0F, 0x2C, 0x82, 0xDC, 0x72, 0x80];
    /// assert_eq!(CheckinToken::from_uid(&uid).as_str(), "2183925508");
    /// ```
    pub fn from_uid(uid: &[u8]) -> Self {
        let mut low = [0u8; 4];
        for (dst, src) in low.iter_mut().zip(uid.iter()) {
            *dst = *src;
        }
        Self(u32::from_le_bytes(low).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CheckinToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for CheckinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque membership reference returned by the booking service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipId(String);

impl MembershipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id is what the service hands back for unusable identities.
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for MembershipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque remote identifier of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the physical resource this controller guards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Booking field that may be moved by an update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingField {
    StartTime,
    EndTime,
}

impl BookingField {
    /// Name of the field on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::StartTime => "from",
            Self::EndTime => "to",
        }
    }
}

/// Where the controller believes the resource stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No known booking.
    Idle,
    /// A booking exists, nobody has badged in since it became current.
    BookedUnattended,
    /// The holder of the current booking has confirmed presence.
    CheckedIn,
}

/// Signal handed to the status display on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusSignal {
    Available,
    BookedUnattended,
    CheckedIn,
    /// The resource is reserved by a different member than the one who badged.
    HeldByOther,
    Error,
}

impl StatusSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::BookedUnattended => "booked-unattended",
            Self::CheckedIn => "checked-in",
            Self::HeldByOther => "held-by-other",
            Self::Error => "error",
        }
    }
}

impl From<SessionPhase> for StatusSignal {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self::Available,
            SessionPhase::BookedUnattended => Self::BookedUnattended,
            SessionPhase::CheckedIn => Self::CheckedIn,
        }
    }
}

impl fmt::Display for StatusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
