//! Reconciler - booking/check-in state machine
//!
//! Owns the controller's belief about the resource (current booking, check-in
//! state, timers) and reconciles it against the booking service on every
//! badge read and every timer tick.
//!
//! Every handler issues at most one mutating remote call. A failed call never
//! changes state; it only raises the error signal.

use crate::config::Config;
use crate::domain::entities::{Booking, BookingRequest};
use crate::domain::ports::{BookingService, ServiceError, StatusDisplay};
use crate::domain::services::IdentityCache;
use crate::domain::time::{to_chrono, truncate_to_minute};
use crate::domain::value_objects::{
    BookingField, BookingId, CheckinToken, MembershipId, ResourceId, SessionPhase, StatusSignal,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Timers and booking parameters for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub resource_id: ResourceId,
    /// Minimum spacing of availability queries while idle
    pub refresh_interval: Duration,
    /// Length of bookings created on site
    pub booking_duration: Duration,
    /// Window after on-site creation in which ending deletes the booking
    pub cancellation_threshold: Duration,
    /// Badge-ins later than this after the start re-anchor the start time
    pub checkin_grace: Duration,
    pub booking_title: String,
    pub booking_comments: String,
}

impl ReconcilerSettings {
    pub fn new(resource_id: ResourceId) -> Self {
        let defaults = Config::default();
        Self {
            resource_id,
            ..Self::from_config(&defaults)
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            resource_id: ResourceId::new(cfg.resource_id.clone()),
            refresh_interval: to_chrono(cfg.refresh_interval()),
            booking_duration: to_chrono(cfg.booking_duration()),
            cancellation_threshold: to_chrono(cfg.cancellation_threshold()),
            checkin_grace: to_chrono(cfg.checkin_grace()),
            booking_title: cfg.booking_title.clone(),
            booking_comments: cfg.booking_comments.clone(),
        }
    }
}

/// How a checked-in session was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Ended inside the cancellation window; the booking was removed.
    Deleted,
    /// Ended later; the booking's end time was moved to now.
    Shortened,
}

/// Result of handling one badge read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeOutcome {
    /// The badge did not resolve to a usable membership.
    Rejected,
    /// A new booking was created and the badge-holder checked in.
    Created,
    /// The holder of an existing booking checked in.
    CheckedIn { reanchored: bool },
    /// The checked-in holder ended the session.
    Ended(SessionEnd),
    /// The resource is booked by another member.
    HeldByOther,
    /// A remote mutation failed; state is unchanged.
    Failed,
}

/// Result of handling one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Neither timer was due.
    Idle,
    /// Availability was queried; `found` tells whether a booking came back.
    Refreshed { found: bool },
    /// The availability query failed.
    RefreshFailed,
    /// The tracked booking passed its end time and was dropped.
    Expired,
}

/// The booking the controller currently tracks.
///
/// Check-in state and creation time live here so that dropping the booking
/// drops them too.
#[derive(Debug, Clone)]
struct ActiveBooking {
    booking: Booking,
    checked_in: bool,
    /// Set only for bookings this controller created.
    created_here_at: Option<DateTime<Utc>>,
}

/// Booking/check-in reconciliation state machine.
pub struct Reconciler {
    service: Arc<dyn BookingService>,
    display: Arc<dyn StatusDisplay>,
    settings: ReconcilerSettings,
    active: Option<ActiveBooking>,
    identities: IdentityCache,
    last_availability_poll_at: DateTime<Utc>,
}

impl Reconciler {
    /// Create an idle reconciler whose refresh timer starts at `now`.
    pub fn new(
        service: Arc<dyn BookingService>,
        display: Arc<dyn StatusDisplay>,
        settings: ReconcilerSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            service,
            display,
            settings,
            active: None,
            identities: IdentityCache::new(),
            last_availability_poll_at: now,
        }
    }

    /// Derive the initial state from the booking service.
    ///
    /// Nothing survives a restart; whatever booking the service reports now
    /// is tracked as unattended.
    pub async fn bootstrap(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let outcome = self.refresh_availability(now).await;
        if outcome != TickOutcome::RefreshFailed {
            self.display.show(self.phase().into());
        }
        outcome
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.active {
            None => SessionPhase::Idle,
            Some(active) if active.checked_in => SessionPhase::CheckedIn,
            Some(_) => SessionPhase::BookedUnattended,
        }
    }

    pub fn current_booking(&self) -> Option<&Booking> {
        self.active.as_ref().map(|a| &a.booking)
    }

    pub fn is_checked_in(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.checked_in)
    }

    /// When this controller created the tracked booking, if it did.
    pub fn booking_created_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().and_then(|a| a.created_here_at)
    }

    pub fn last_availability_poll_at(&self) -> DateTime<Utc> {
        self.last_availability_poll_at
    }

    pub fn identity_cache(&self) -> &IdentityCache {
        &self.identities
    }

    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    /// Whether a tick at `now` has work to do.
    ///
    /// While idle the refresh timer gates the tick; while booked the booking's
    /// end time does.
    pub fn tick_due(&self, now: DateTime<Utc>) -> bool {
        match &self.active {
            None => now - self.last_availability_poll_at >= self.settings.refresh_interval,
            Some(active) => active.booking.has_ended(now),
        }
    }

    /// Handle a timer tick.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let Some(active) = &self.active else {
            if now - self.last_availability_poll_at < self.settings.refresh_interval {
                return TickOutcome::Idle;
            }
            tracing::debug!("refresh interval elapsed, checking availability");
            let outcome = self.refresh_availability(now).await;
            if let TickOutcome::Refreshed { .. } = outcome {
                // Also clears an error left over from an earlier badge.
                self.display.show(self.phase().into());
            }
            return outcome;
        };

        if !active.booking.has_ended(now) {
            return TickOutcome::Idle;
        }

        // Trust the end time fetched earlier; no remote confirmation.
        tracing::info!(
            "booking {} reached its end time {}, resource available",
            active.booking.id,
            active.booking.end_time
        );
        self.clear_booking();
        self.display.show(StatusSignal::Available);
        TickOutcome::Expired
    }

    /// Handle a distinct badge read.
    pub async fn on_badge(&mut self, token: &CheckinToken, now: DateTime<Utc>) -> BadgeOutcome {
        tracing::info!("badge read, check-in token {}", token);

        let membership_id = match self.identities.resolve(token, self.service.as_ref()).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("cannot book resource for token {}: {}", token, e);
                self.display.show(StatusSignal::Error);
                return BadgeOutcome::Rejected;
            }
        };

        let Some(active) = &self.active else {
            return self.create_on_site(membership_id, now).await;
        };

        if !active.booking.is_held_by(&membership_id) {
            tracing::info!(
                "membership {} does not hold booking {} (held by {})",
                membership_id,
                active.booking.id,
                active.booking.membership_id
            );
            self.display.show(StatusSignal::HeldByOther);
            return BadgeOutcome::HeldByOther;
        }

        if active.checked_in {
            self.end_session(now).await
        } else {
            self.check_in(now).await
        }
    }

    /// Idle + valid identity: book the resource for the default duration.
    async fn create_on_site(
        &mut self,
        membership_id: MembershipId,
        now: DateTime<Utc>,
    ) -> BadgeOutcome {
        let request = BookingRequest::starting_at(
            membership_id,
            now,
            self.settings.booking_duration,
            self.settings.booking_title.clone(),
            self.settings.booking_comments.clone(),
        );

        match self
            .service
            .create_booking(&self.settings.resource_id, &request)
            .await
        {
            Ok(booking) => {
                tracing::info!(
                    "created booking {} for membership {} until {}, member checked in",
                    booking.id,
                    booking.membership_id,
                    booking.end_time
                );
                self.active = Some(ActiveBooking {
                    booking,
                    checked_in: true,
                    created_here_at: Some(now),
                });
                self.display.show(StatusSignal::CheckedIn);
                BadgeOutcome::Created
            }
            Err(e) => {
                tracing::error!("booking creation failed: {}", e);
                self.display.show(StatusSignal::Error);
                BadgeOutcome::Failed
            }
        }
    }

    /// Unattended booking claimed by its holder.
    async fn check_in(&mut self, now: DateTime<Utc>) -> BadgeOutcome {
        let Some(active) = self.active.as_mut() else {
            return BadgeOutcome::Failed;
        };

        // An upcoming booking found by the look-ahead starts when its holder
        // arrives, so a check-in before the start re-anchors as well.
        let late_by = active.booking.elapsed_since_start(now);
        if late_by >= Duration::zero() && late_by <= self.settings.checkin_grace {
            tracing::info!("member checked in to booking {}", active.booking.id);
            active.checked_in = true;
            self.display.show(StatusSignal::CheckedIn);
            return BadgeOutcome::CheckedIn { reanchored: false };
        }

        match self
            .service
            .update_booking(&active.booking.id, BookingField::StartTime, now)
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    "member checked in {}s off the start, booking {} now starts at {}",
                    late_by.num_seconds(),
                    updated.id,
                    updated.start_time
                );
                active.booking = updated;
                active.checked_in = true;
                self.display.show(StatusSignal::CheckedIn);
                BadgeOutcome::CheckedIn { reanchored: true }
            }
            Err(e) => {
                tracing::error!("moving start of booking {} failed: {}", active.booking.id, e);
                self.display.show(StatusSignal::Error);
                BadgeOutcome::Failed
            }
        }
    }

    /// Checked-in holder badges again: end the session.
    async fn end_session(&mut self, now: DateTime<Utc>) -> BadgeOutcome {
        let Some(active) = &self.active else {
            return BadgeOutcome::Failed;
        };
        let booking_id = active.booking.id.clone();

        // Bookings seen from other channels have no creation time here and
        // are shortened, unless shortening would leave an empty window.
        let within_cancellation = active
            .created_here_at
            .is_some_and(|created| now - created < self.settings.cancellation_threshold);
        let empty_window =
            truncate_to_minute(now) <= truncate_to_minute(active.booking.start_time);

        let result = if within_cancellation || empty_window {
            self.service
                .delete_booking(&booking_id)
                .await
                .map(|()| SessionEnd::Deleted)
        } else {
            self.service
                .update_booking(&booking_id, BookingField::EndTime, now)
                .await
                .map(|_| SessionEnd::Shortened)
        };

        match result {
            Ok(end) => {
                tracing::info!("session on booking {} ended ({:?})", booking_id, end);
                self.clear_booking();
                self.display.show(StatusSignal::Available);
                BadgeOutcome::Ended(end)
            }
            Err(e) => {
                log_end_failure(&booking_id, &e);
                self.display.show(StatusSignal::Error);
                BadgeOutcome::Failed
            }
        }
    }

    /// Query the current booking and reset the refresh timer.
    async fn refresh_availability(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.last_availability_poll_at = now;

        match self
            .service
            .get_current_booking(&self.settings.resource_id)
            .await
        {
            Ok(Some(booking)) => {
                tracing::info!(
                    "resource booked by membership {} until {} (booking {})",
                    booking.membership_id,
                    booking.end_time,
                    booking.id
                );
                self.active = Some(ActiveBooking {
                    booking,
                    checked_in: false,
                    created_here_at: None,
                });
                TickOutcome::Refreshed { found: true }
            }
            Ok(None) => {
                tracing::debug!("resource is available");
                TickOutcome::Refreshed { found: false }
            }
            Err(e) => {
                tracing::warn!("availability check failed: {}", e);
                self.display.show(StatusSignal::Error);
                TickOutcome::RefreshFailed
            }
        }
    }

    /// Drop the tracked booking together with its check-in and identity.
    fn clear_booking(&mut self) {
        self.active = None;
        self.identities.invalidate();
    }
}

fn log_end_failure(booking_id: &BookingId, e: &ServiceError) {
    match e {
        ServiceError::Conflict(_) => {
            tracing::error!("booking {} is owned by another channel: {}", booking_id, e)
        }
        _ => tracing::error!("ending booking {} failed: {}", booking_id, e),
    }
}
