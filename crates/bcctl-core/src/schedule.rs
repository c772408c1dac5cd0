use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::queue::{Input, TimerKind};

/// Arms delayed timer firings.
///
/// A firing is delivered as [`Input::Timer`] to the queue of the execution that armed it.
/// Timers are never cancelled one by one.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind);
}

/// Scheduler backed by tokio sleeps.
///
/// Must be used from within a tokio runtime. [`TokioScheduler::shutdown`] drops every
/// pending sleep at once; firings after the queue is closed are discarded.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Input>,
    cancel: CancellationToken,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::UnboundedSender<Input>) -> Self {
        Self {
            tx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind) {
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();

        trace!(%kind, delay_ms = delay.as_millis() as u64, "timer armed");
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if tx.send(Input::Timer(kind)).is_err() {
                        trace!(%kind, "timer fired after queue closed");
                    }
                }
            }
        });
    }
}
