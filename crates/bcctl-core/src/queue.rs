use std::fmt;

use bcctl_model::{ExitOutcome, Target};
use serde_json::Value;

/// Timers armed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Nobody started the command in time.
    WaitingTimeout,
    /// The started command did not complete in time.
    PendingTimeout,
    /// End of the grace window after a failure.
    Stop,
    /// No info event arrived in time.
    InfoTimeout,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::WaitingTimeout => "waiting_timeout",
            TimerKind::PendingTimeout => "pending_timeout",
            TimerKind::Stop => "stop",
            TimerKind::InfoTimeout => "info_timeout",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the single consumer of an execution reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// The relay session is up; the request can be published.
    SessionOpened,
    /// Raw event received for `target`.
    Event { target: Target, event: Value },
    Timer(TimerKind),
}

/// What the pump loop does after handling one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Finish(ExitOutcome),
}
