use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol state of one tracked execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecState {
    /// Nothing published yet.
    Idle,
    /// Request published, no receiver has started it.
    Waiting,
    /// A receiver acknowledged the start; completion outstanding.
    Pending,
    /// The command finished successfully.
    Success,
    /// The command failed or one of the timeouts expired.
    Failure,
}

impl ExecState {
    /// Returns `true` for `Success` and `Failure`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecState::Success | ExecState::Failure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecState::Idle => "idle",
            ExecState::Waiting => "waiting",
            ExecState::Pending => "pending",
            ExecState::Success => "success",
            ExecState::Failure => "failure",
        }
    }
}

impl Default for ExecState {
    fn default() -> Self {
        ExecState::Idle
    }
}

impl fmt::Display for ExecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
