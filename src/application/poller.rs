//! Poll Loop
//!
//! Drives the reconciler: checks the timers, polls the reader, and feeds
//! distinct badge reads to the state machine. Events are handled strictly
//! one at a time.

use crate::application::reconciler::{BadgeOutcome, Reconciler, TickOutcome};
use crate::domain::ports::{CardReader, Clock};
use crate::domain::services::BadgeDebouncer;
use crate::domain::value_objects::CheckinToken;
use crate::infrastructure::ShutdownController;
use std::sync::Arc;
use std::time::Duration;

/// What one loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub tick: TickOutcome,
    pub badge: Option<BadgeOutcome>,
}

/// Single-threaded controller loop.
pub struct Poller<R: CardReader> {
    reconciler: Reconciler,
    reader: R,
    clock: Arc<dyn Clock>,
    debouncer: BadgeDebouncer,
    poll_interval: Duration,
}

impl<R: CardReader> Poller<R> {
    pub fn new(
        reconciler: Reconciler,
        reader: R,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reconciler,
            reader,
            clock,
            debouncer: BadgeDebouncer::new(),
            poll_interval,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run one iteration: timers first, then the reader.
    pub async fn step(&mut self) -> StepReport {
        let now = self.clock.now();
        let tick = if self.reconciler.tick_due(now) {
            self.reconciler.on_tick(now).await
        } else {
            TickOutcome::Idle
        };

        let poll = self.reader.poll().await;
        let badge = match self.debouncer.accept(poll) {
            Some(uid) => {
                let token = CheckinToken::from_uid(&uid);
                let now = self.clock.now();
                Some(self.reconciler.on_badge(&token, now).await)
            }
            None => None,
        };

        StepReport { tick, badge }
    }

    /// Loop until shutdown.
    ///
    /// Shutdown is only observed between iterations, so an in-flight remote
    /// call always completes. Nothing is cleaned up remotely on exit.
    pub async fn run(&mut self, shutdown: ShutdownController) {
        tracing::info!(
            "poll loop started, interval {}ms",
            self.poll_interval.as_millis()
        );

        while !shutdown.is_shutdown() {
            let report = self.step().await;
            if let Some(badge) = &report.badge {
                tracing::debug!("badge handled: {:?}", badge);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.wait() => break,
            }
        }

        tracing::info!(
            "poll loop stopped in phase {:?}",
            self.reconciler.phase()
        );
    }
}
