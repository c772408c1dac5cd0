use bcctl_model::ExecState;

use crate::machine::Signal;

/// Why the machine entered `Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// A receiver reported the started command as failed.
    Failed,
    /// Nobody started the command in time.
    WaitingTimeout,
    /// The command started but did not complete in time.
    PendingTimeout,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Request published, waiting for a receiver.
    Waiting,
    /// A receiver failed before anybody started the command; others may still pick it up.
    FailedWhileWaiting,
    /// The command started.
    Pending,
    /// `started` seen again while pending, under [`PendingRearm::EveryStart`].
    PendingRestarted,
    Success,
    Failure(FailureCause),
}

/// When the pending timer is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingRearm {
    /// Once, when the machine moves from `waiting` to `pending`.
    #[default]
    OnEntry,
    /// On every `started`, including repeated ones while already pending.
    EveryStart,
}

/// Transition table.
///
/// `None` means the signal is not accepted in `state`. Several rows are deliberate
/// self-loops without effect: timers are never cancelled, so a timer that fires after
/// the transition it guarded must be absorbed without touching the state.
pub fn transition(
    state: ExecState,
    signal: Signal,
    rearm: PendingRearm,
) -> Option<(ExecState, Option<Effect>)> {
    use ExecState::*;

    let next = match (state, signal) {
        (Idle, Signal::Request) => (Waiting, Some(Effect::Waiting)),
        (Failure, Signal::Request) => (Failure, None),

        (Idle | Waiting, Signal::WaitingTimeout) => (
            Failure,
            Some(Effect::Failure(FailureCause::WaitingTimeout)),
        ),
        (Pending, Signal::WaitingTimeout) => (Pending, None),
        (Failure, Signal::WaitingTimeout) => (Failure, None),

        (Waiting, Signal::Started) => (Pending, Some(Effect::Pending)),
        (Pending, Signal::Started) => match rearm {
            PendingRearm::OnEntry => (Pending, None),
            PendingRearm::EveryStart => (Pending, Some(Effect::PendingRestarted)),
        },

        (Waiting, Signal::Failed) => (Waiting, Some(Effect::FailedWhileWaiting)),
        (Pending, Signal::Failed) => (Failure, Some(Effect::Failure(FailureCause::Failed))),
        (Failure, Signal::Failed) => (Failure, None),

        (Pending, Signal::PendingTimeout) => (
            Failure,
            Some(Effect::Failure(FailureCause::PendingTimeout)),
        ),

        (Idle | Pending, Signal::Finished) => (Success, Some(Effect::Success)),
        (Success, Signal::Finished) => (Success, None),

        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ExecState; 5] = [
        ExecState::Idle,
        ExecState::Waiting,
        ExecState::Pending,
        ExecState::Success,
        ExecState::Failure,
    ];

    fn run(signals: &[Signal]) -> ExecState {
        signals.iter().fold(ExecState::Idle, |state, signal| {
            transition(state, *signal, PendingRearm::OnEntry)
                .map(|(next, _)| next)
                .unwrap_or(state)
        })
    }

    #[test]
    fn request_started_finished_succeeds() {
        use Signal::*;
        assert_eq!(run(&[Request, Started, Finished]), ExecState::Success);
    }

    #[test]
    fn request_then_waiting_timeout_fails() {
        use Signal::*;
        assert_eq!(run(&[Request, WaitingTimeout]), ExecState::Failure);
    }

    #[test]
    fn late_waiting_timeout_is_absorbed_while_pending() {
        assert_eq!(
            transition(ExecState::Pending, Signal::WaitingTimeout, PendingRearm::OnEntry),
            Some((ExecState::Pending, None))
        );
        use Signal::*;
        assert_eq!(run(&[Request, Started, WaitingTimeout]), ExecState::Pending);
    }

    #[test]
    fn failure_absorbs_stragglers() {
        for signal in [Signal::Request, Signal::Failed, Signal::WaitingTimeout] {
            assert_eq!(
                transition(ExecState::Failure, signal, PendingRearm::OnEntry),
                Some((ExecState::Failure, None)),
                "{signal}"
            );
        }
    }

    #[test]
    fn failed_while_waiting_keeps_waiting() {
        assert_eq!(
            transition(ExecState::Waiting, Signal::Failed, PendingRearm::OnEntry),
            Some((ExecState::Waiting, Some(Effect::FailedWhileWaiting)))
        );
    }

    #[test]
    fn timeouts_carry_their_cause() {
        assert_eq!(
            transition(ExecState::Waiting, Signal::WaitingTimeout, PendingRearm::OnEntry),
            Some((
                ExecState::Failure,
                Some(Effect::Failure(FailureCause::WaitingTimeout))
            ))
        );
        assert_eq!(
            transition(ExecState::Idle, Signal::WaitingTimeout, PendingRearm::OnEntry),
            Some((
                ExecState::Failure,
                Some(Effect::Failure(FailureCause::WaitingTimeout))
            ))
        );
        assert_eq!(
            transition(ExecState::Pending, Signal::PendingTimeout, PendingRearm::OnEntry),
            Some((
                ExecState::Failure,
                Some(Effect::Failure(FailureCause::PendingTimeout))
            ))
        );
    }

    #[test]
    fn finished_is_accepted_from_idle_pending_and_success() {
        assert!(transition(ExecState::Idle, Signal::Finished, PendingRearm::OnEntry).is_some());
        assert!(transition(ExecState::Pending, Signal::Finished, PendingRearm::OnEntry).is_some());
        assert_eq!(
            transition(ExecState::Success, Signal::Finished, PendingRearm::OnEntry),
            Some((ExecState::Success, None))
        );
        assert!(transition(ExecState::Waiting, Signal::Finished, PendingRearm::OnEntry).is_none());
        assert!(transition(ExecState::Failure, Signal::Finished, PendingRearm::OnEntry).is_none());
    }

    #[test]
    fn started_self_loop_depends_on_rearm_policy() {
        assert_eq!(
            transition(ExecState::Pending, Signal::Started, PendingRearm::OnEntry),
            Some((ExecState::Pending, None))
        );
        assert_eq!(
            transition(ExecState::Pending, Signal::Started, PendingRearm::EveryStart),
            Some((ExecState::Pending, Some(Effect::PendingRestarted)))
        );
    }

    #[test]
    fn rows_outside_the_table_are_rejected() {
        let accepted: &[(ExecState, Signal)] = &[
            (ExecState::Idle, Signal::Request),
            (ExecState::Failure, Signal::Request),
            (ExecState::Idle, Signal::WaitingTimeout),
            (ExecState::Waiting, Signal::WaitingTimeout),
            (ExecState::Pending, Signal::WaitingTimeout),
            (ExecState::Failure, Signal::WaitingTimeout),
            (ExecState::Waiting, Signal::Started),
            (ExecState::Pending, Signal::Started),
            (ExecState::Waiting, Signal::Failed),
            (ExecState::Pending, Signal::Failed),
            (ExecState::Failure, Signal::Failed),
            (ExecState::Pending, Signal::PendingTimeout),
            (ExecState::Idle, Signal::Finished),
            (ExecState::Pending, Signal::Finished),
            (ExecState::Success, Signal::Finished),
        ];

        for state in STATES {
            for signal in Signal::ALL {
                let expected = accepted.contains(&(state, signal));
                let actual = transition(state, signal, PendingRearm::OnEntry).is_some();
                assert_eq!(actual, expected, "{state} on {signal}");
            }
        }
    }

    #[test]
    fn terminal_outcome_never_changes() {
        use Signal::*;
        let tails: &[&[Signal]] = &[
            &[Started, Failed, WaitingTimeout, PendingTimeout],
            &[Finished, Failed, Started, WaitingTimeout],
            &[Request, Started, Finished],
        ];
        for start in [ExecState::Success, ExecState::Failure] {
            for tail in tails {
                let end = tail.iter().fold(start, |state, signal| {
                    transition(state, *signal, PendingRearm::EveryStart)
                        .map(|(next, _)| next)
                        .unwrap_or(state)
                });
                assert_eq!(end, start);
            }
        }
    }
}
