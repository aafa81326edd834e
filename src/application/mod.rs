//! Application Layer
//!
//! The booking/check-in state machine and the loop that drives it.

pub mod poller;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod test_support;

pub use poller::{Poller, StepReport};
pub use reconciler::{BadgeOutcome, Reconciler, ReconcilerSettings, SessionEnd, TickOutcome};
