//! On-site Booking Library
//!
//! Badge-driven booking controller for a single shared resource. Exposes
//! the components for the binary and for integration tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{Poller, Reconciler, ReconcilerSettings};
pub use config::load_config;
pub use domain::entities::{Booking, BookingRequest, Identity};
pub use domain::ports::{BookingService, CardReader, Clock, ServiceError, StatusDisplay};
pub use domain::value_objects::{CheckinToken, MembershipId, StatusSignal};
