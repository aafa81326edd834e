//! Adapters Layer
//!
//! Inbound adapters feed events into the controller (card reader, status
//! API); outbound adapters implement the domain ports (booking service,
//! status display, clock).

pub mod inbound;
pub mod outbound;
