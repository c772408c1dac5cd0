//! Execution state machine.
//!
//! [`transition`] is the whole protocol; [`ExecutionMachine`] owns the current state and
//! forwards the resulting [`Effect`] to a [`MachineHooks`] implementation.

mod signal;
pub use signal::Signal;

mod table;
pub use table::{Effect, FailureCause, PendingRearm, transition};

use bcctl_model::ExecState;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    #[error("signal '{signal}' is not accepted in state '{from}'")]
    Rejected { from: ExecState, signal: Signal },
}

/// Context handed to hooks for one accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub signal: Signal,
    pub from: ExecState,
    pub to: ExecState,
    /// Descriptive message of whatever triggered the signal (event id, timer name).
    pub message: String,
    pub effect: Option<Effect>,
}

/// Callbacks fired by [`ExecutionMachine::fire`].
///
/// All methods default to no-ops. Timeout failures call their dedicated hook first and
/// then [`MachineHooks::on_failure`]; the generic hook runs exactly once per failure.
pub trait MachineHooks {
    fn on_waiting(&mut self, _t: &Transition) {}

    /// `src` is `Waiting` for a failure reported before anybody started the command,
    /// `Pending` when it moves the machine to `Failure`.
    fn on_failed(&mut self, _src: ExecState, _t: &Transition) {}

    fn on_pending(&mut self, _t: &Transition) {}
    fn on_success(&mut self, _t: &Transition) {}
    fn on_failure(&mut self, _t: &Transition) {}
    fn on_waiting_timeout(&mut self, _t: &Transition) {}
    fn on_pending_timeout(&mut self, _t: &Transition) {}
}

/// Hooks that do nothing.
impl MachineHooks for () {}

#[derive(Debug, Default)]
pub struct ExecutionMachine {
    state: ExecState,
    rearm: PendingRearm,
}

impl ExecutionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rearm(mut self, rearm: PendingRearm) -> Self {
        self.rearm = rearm;
        self
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn rearm(&self) -> PendingRearm {
        self.rearm
    }

    /// Apply `signal`; rejected signals leave the state untouched.
    pub fn fire<H: MachineHooks + ?Sized>(
        &mut self,
        signal: Signal,
        message: impl Into<String>,
        hooks: &mut H,
    ) -> Result<Transition, MachineError> {
        let from = self.state;
        let (to, effect) = transition(from, signal, self.rearm)
            .ok_or(MachineError::Rejected { from, signal })?;

        self.state = to;
        let t = Transition {
            signal,
            from,
            to,
            message: message.into(),
            effect,
        };
        trace!(%signal, %from, %to, message = %t.message, "transition");

        match effect {
            None => {}
            Some(Effect::Waiting) => hooks.on_waiting(&t),
            Some(Effect::FailedWhileWaiting) => hooks.on_failed(ExecState::Waiting, &t),
            Some(Effect::Pending | Effect::PendingRestarted) => hooks.on_pending(&t),
            Some(Effect::Success) => hooks.on_success(&t),
            Some(Effect::Failure(cause)) => {
                match cause {
                    FailureCause::Failed => hooks.on_failed(ExecState::Pending, &t),
                    FailureCause::WaitingTimeout => hooks.on_waiting_timeout(&t),
                    FailureCause::PendingTimeout => hooks.on_pending_timeout(&t),
                }
                hooks.on_failure(&t);
            }
        }
        Ok(t)
    }

    /// Look `label` up and fire it.
    pub fn fire_label<H: MachineHooks + ?Sized>(
        &mut self,
        label: &str,
        message: impl Into<String>,
        hooks: &mut H,
    ) -> Result<Transition, MachineError> {
        let signal = label.parse::<Signal>()?;
        self.fire(signal, message, hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Calls(Vec<String>);

    impl MachineHooks for Calls {
        fn on_waiting(&mut self, _t: &Transition) {
            self.0.push("waiting".into());
        }
        fn on_failed(&mut self, src: ExecState, _t: &Transition) {
            self.0.push(format!("failed@{src}"));
        }
        fn on_pending(&mut self, _t: &Transition) {
            self.0.push("pending".into());
        }
        fn on_success(&mut self, t: &Transition) {
            self.0.push(format!("success:{}", t.message));
        }
        fn on_failure(&mut self, _t: &Transition) {
            self.0.push("failure".into());
        }
        fn on_waiting_timeout(&mut self, _t: &Transition) {
            self.0.push("waiting_timeout".into());
        }
        fn on_pending_timeout(&mut self, _t: &Transition) {
            self.0.push("pending_timeout".into());
        }
    }

    #[test]
    fn happy_path_fires_entry_hooks() {
        let mut m = ExecutionMachine::new();
        let mut calls = Calls::default();

        m.fire(Signal::Request, "Execute", &mut calls).unwrap();
        m.fire(Signal::Started, "cmd", &mut calls).unwrap();
        m.fire(Signal::Finished, "cmd", &mut calls).unwrap();

        assert_eq!(m.state(), ExecState::Success);
        assert_eq!(calls.0, vec!["waiting", "pending", "success:cmd"]);
    }

    #[test]
    fn waiting_timeout_runs_dedicated_then_generic_failure() {
        let mut m = ExecutionMachine::new();
        let mut calls = Calls::default();

        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::WaitingTimeout, "timer", &mut calls).unwrap();

        assert_eq!(calls.0, vec!["waiting", "waiting_timeout", "failure"]);
    }

    #[test]
    fn pending_timeout_runs_dedicated_then_generic_failure() {
        let mut m = ExecutionMachine::new();
        let mut calls = Calls::default();

        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::Started, "cmd", &mut calls).unwrap();
        m.fire(Signal::PendingTimeout, "timer", &mut calls).unwrap();

        assert_eq!(
            calls.0,
            vec!["waiting", "pending", "pending_timeout", "failure"]
        );
    }

    #[test]
    fn failed_while_waiting_is_reported_but_keeps_state() {
        let mut m = ExecutionMachine::new();
        let mut calls = Calls::default();

        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::Failed, "cmd", &mut calls).unwrap();

        assert_eq!(m.state(), ExecState::Waiting);
        assert_eq!(calls.0, vec!["waiting", "failed@waiting"]);
    }

    #[test]
    fn failed_while_pending_fails_once() {
        let mut m = ExecutionMachine::new();
        let mut calls = Calls::default();

        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::Started, "cmd", &mut calls).unwrap();
        m.fire(Signal::Failed, "cmd", &mut calls).unwrap();
        m.fire(Signal::Failed, "cmd", &mut calls).unwrap();
        m.fire(Signal::WaitingTimeout, "timer", &mut calls).unwrap();

        assert_eq!(m.state(), ExecState::Failure);
        assert_eq!(
            calls.0,
            vec!["waiting", "pending", "failed@pending", "failure"]
        );
    }

    #[test]
    fn rejected_signal_keeps_state() {
        let mut m = ExecutionMachine::new();
        let err = m.fire(Signal::Started, "cmd", &mut ()).unwrap_err();

        assert_eq!(
            err,
            MachineError::Rejected {
                from: ExecState::Idle,
                signal: Signal::Started
            }
        );
        assert_eq!(m.state(), ExecState::Idle);
    }

    #[test]
    fn unknown_label_is_reported() {
        let mut m = ExecutionMachine::new();
        let err = m.fire_label("exploded", "cmd", &mut ()).unwrap_err();
        assert!(matches!(err, MachineError::UnknownSignal(_)));
        assert_eq!(m.state(), ExecState::Idle);
    }

    #[test]
    fn started_twice_rearms_only_with_every_start() {
        let mut calls = Calls::default();
        let mut m = ExecutionMachine::new();
        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::Started, "a", &mut calls).unwrap();
        m.fire(Signal::Started, "b", &mut calls).unwrap();
        assert_eq!(calls.0, vec!["waiting", "pending"]);

        let mut calls = Calls::default();
        let mut m = ExecutionMachine::new().with_rearm(PendingRearm::EveryStart);
        m.fire(Signal::Request, "r", &mut calls).unwrap();
        m.fire(Signal::Started, "a", &mut calls).unwrap();
        m.fire(Signal::Started, "b", &mut calls).unwrap();
        assert_eq!(calls.0, vec!["waiting", "pending", "pending"]);
    }

    #[test]
    fn any_sequence_after_request_stays_in_known_states() {
        use Signal::*;
        let alphabet = [WaitingTimeout, Started, Failed];
        // every sequence of length 4 over the alphabet
        for n in 0..(3usize.pow(4)) {
            let mut m = ExecutionMachine::new();
            m.fire(Request, "r", &mut ()).unwrap();
            let mut k = n;
            for _ in 0..4 {
                let _ = m.fire(alphabet[k % 3], "x", &mut ());
                k /= 3;
            }
            assert!(matches!(
                m.state(),
                ExecState::Waiting | ExecState::Pending | ExecState::Failure
            ));
        }
    }
}
