use std::{io::Write, time::Duration};

use bcctl_model::{ExitOutcome, Target};
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::{
    queue::{Input, Step, TimerKind},
    schedule::Scheduler,
};

/// Waits for the first event published for a target and prints it.
///
/// Info events carry no tracking id; any event for the target counts.
pub struct InfoWatch<W> {
    target: Target,
    timeout: Duration,
    out: W,
}

impl<W: Write> InfoWatch<W> {
    pub fn new(target: impl Into<Target>, timeout: Duration, out: W) -> Self {
        Self {
            target: target.into(),
            timeout,
            out,
        }
    }

    pub fn start<S: Scheduler + ?Sized>(&self, scheduler: &S) {
        scheduler.schedule(self.timeout, TimerKind::InfoTimeout);
    }

    pub fn handle(&mut self, input: Input) -> Step {
        match input {
            Input::Event { target, event } if target == self.target => {
                Step::Finish(self.emit(&event))
            }
            Input::Event { target, .. } => {
                trace!(exec_target = %target, "ignoring event for another target");
                Step::Continue
            }
            Input::Timer(TimerKind::InfoTimeout) => {
                error!(
                    "Timed out after {} seconds waiting for an info event.",
                    self.timeout.as_secs()
                );
                Step::Finish(ExitOutcome::Failure)
            }
            Input::SessionOpened => {
                debug!(exec_target = %self.target, "waiting for an info event");
                Step::Continue
            }
            Input::Timer(kind) => {
                trace!(%kind, "timer not used by info requests");
                Step::Continue
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Value) -> ExitOutcome {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());

        match written {
            Ok(()) => ExitOutcome::Success,
            Err(e) => {
                error!(error = %e, "failed to write info event");
                ExitOutcome::Failure
            }
        }
    }
}
