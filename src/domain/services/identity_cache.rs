//! Identity Cache
//!
//! One-entry memo from the last badge token to its membership id.
//! The entry is only trusted for the lifetime of one booking: the reconciler
//! invalidates it whenever it clears the tracked booking.

use crate::domain::entities::Identity;
use crate::domain::ports::{BookingService, ServiceError};
use crate::domain::value_objects::{CheckinToken, MembershipId};

/// Single-entry identity cache.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entry: Option<Identity>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Resolve a check-in token to a membership id.
    ///
    /// A cache hit returns without a remote call. On a miss the booking
    /// service is asked; only a usable answer replaces the entry. Failures
    /// leave the cache untouched.
    pub async fn resolve(
        &mut self,
        token: &CheckinToken,
        service: &dyn BookingService,
    ) -> Result<MembershipId, ServiceError> {
        if let Some(membership_id) = self.cached(token) {
            tracing::debug!("membership {} for token {} served from cache", membership_id, token);
            return Ok(membership_id.clone());
        }

        let membership_id = service.lookup_identity(token).await?;
        if !membership_id.is_valid() {
            return Err(ServiceError::InvalidIdentity(token.to_string()));
        }

        tracing::debug!("membership {} resolved for token {}", membership_id, token);
        self.entry = Some(Identity::new(token.clone(), membership_id.clone()));
        Ok(membership_id)
    }

    /// The cached membership for `token`, if it is the one held.
    pub fn cached(&self, token: &CheckinToken) -> Option<&MembershipId> {
        self.entry
            .as_ref()
            .filter(|identity| &identity.checkin_token == token)
            .map(|identity| &identity.membership_id)
    }

    /// Forget the cached identity.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// The cached identity, if any.
    pub fn entry(&self) -> Option<&Identity> {
        self.entry.as_ref()
    }
}
