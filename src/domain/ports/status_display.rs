//! Status Display Port
//!
//! Defines the interface for the indicator that shows the resource status.

use crate::domain::value_objects::StatusSignal;

/// Indicator showing the controller's status to people at the resource.
///
/// This is an outbound port. Rendering (LEDs, tones, a web page) is entirely
/// the implementation's concern; the controller only picks the signal.
pub trait StatusDisplay: Send + Sync {
    /// Show a status signal. Must not block for long: it runs inside the loop.
    fn show(&self, signal: StatusSignal);
}
