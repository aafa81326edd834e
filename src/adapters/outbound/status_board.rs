//! Status Board
//!
//! Implements StatusDisplay by logging every signal and keeping the latest
//! one for the status API. Physical indicators can poll the board instead of
//! being driven from inside the loop.

use crate::domain::ports::{Clock, StatusDisplay};
use crate::domain::value_objects::StatusSignal;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Latest signal and when it was first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub signal: StatusSignal,
    pub since: DateTime<Utc>,
    /// Number of signals shown so far
    pub updates: u64,
}

/// Shared status board.
pub struct StatusBoard {
    state: RwLock<StatusSnapshot>,
    clock: Arc<dyn Clock>,
}

impl StatusBoard {
    /// Create a board showing `available` until the first signal arrives.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            state: RwLock::new(StatusSnapshot {
                signal: StatusSignal::Available,
                since: now,
                updates: 0,
            }),
            clock,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        *self.state.read()
    }

    pub fn current(&self) -> StatusSignal {
        self.state.read().signal
    }
}

impl StatusDisplay for StatusBoard {
    fn show(&self, signal: StatusSignal) {
        match signal {
            StatusSignal::Error => tracing::warn!("status: {}", signal),
            _ => tracing::info!("status: {}", signal),
        }

        let mut state = self.state.write();
        // Repeating a signal keeps the time it was first shown.
        if state.signal != signal || state.updates == 0 {
            state.since = self.clock.now();
        }
        state.signal = signal;
        state.updates += 1;
    }
}
