//! Cancellable periodic ticker.
//!
//! Runs a callback on a fixed interval on the Tokio runtime until the callback
//! asks to stop or the owning [`Ticker`] is dropped or stopped.

use std::{ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Owned handle to a running tick task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct Ticker {
    /// Label used in trace logs.
    id: String,
    /// Cancels the tick loop.
    token: CancellationToken,
    /// Task driving the loop.
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Start calling `on_tick` every `period`, first after one full period.
    ///
    /// The loop ends when `on_tick` returns `ControlFlow::Break`, or when the
    /// ticker is stopped or dropped. Must be called from within a Tokio runtime.
    pub fn start<F>(id: impl Into<String>, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let id = id.into();
        let token = CancellationToken::new();
        let cancel = token.clone();
        let id_for_log = id.clone();

        let fut = async move {
            trace!("ticker_start" = %id_for_log, period_ms = period.as_millis());
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!("ticker_cancelled" = %id_for_log);
                        return;
                    }
                    _ = ticker.tick() => {
                        if on_tick().is_break() {
                            trace!("ticker_done" = %id_for_log);
                            return;
                        }
                    }
                }
            }
        };

        Self {
            id,
            token,
            handle: tokio::spawn(fut),
        }
    }

    /// Stop the ticker (non-blocking). No tick fires after this returns.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
            trace!("ticker_stop" = %self.id);
        }
    }

    /// True once the tick loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
