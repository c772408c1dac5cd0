use std::fmt;

use crate::ExecState;

/// Terminal result of a run, surfaced as the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure,
}

impl ExitOutcome {
    /// Process exit status: `0` on success, `1` otherwise.
    pub fn code(&self) -> u8 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure => 1,
        }
    }

    /// Outcome implied by a terminal state, `None` for non-terminal ones.
    pub fn from_state(state: ExecState) -> Option<Self> {
        match state {
            ExecState::Success => Some(ExitOutcome::Success),
            ExecState::Failure => Some(ExitOutcome::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => f.write_str("success"),
            ExitOutcome::Failure => f.write_str("failure"),
        }
    }
}
