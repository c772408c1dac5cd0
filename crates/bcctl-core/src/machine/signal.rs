use std::{fmt, str::FromStr};

use crate::machine::MachineError;

/// Input that may move the execution machine.
///
/// Remote events name signals by their label in the event `state` field; timers fire
/// `WaitingTimeout` / `PendingTimeout`; the controller fires `Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Request,
    WaitingTimeout,
    Started,
    Failed,
    PendingTimeout,
    Finished,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::Request,
        Signal::WaitingTimeout,
        Signal::Started,
        Signal::Failed,
        Signal::PendingTimeout,
        Signal::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Request => "request",
            Signal::WaitingTimeout => "waiting_timeout",
            Signal::Started => "started",
            Signal::Failed => "failed",
            Signal::PendingTimeout => "pending_timeout",
            Signal::Finished => "finished",
        }
    }
}

impl FromStr for Signal {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .into_iter()
            .find(|signal| signal.as_str() == s)
            .ok_or_else(|| MachineError::UnknownSignal(s.to_string()))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back() {
        for signal in Signal::ALL {
            assert_eq!(signal.as_str().parse::<Signal>().unwrap(), signal);
        }
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = "exploded".parse::<Signal>().unwrap_err();
        assert!(matches!(err, MachineError::UnknownSignal(s) if s == "exploded"));
        assert!("Started".parse::<Signal>().is_err());
    }
}
