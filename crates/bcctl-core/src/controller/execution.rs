use std::{sync::Arc, time::Duration};

use bcctl_model::{ExecState, ExecutionRequest, ExitOutcome};
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::{
    controller::{ExecutionSettings, MIN_WAITING_TIMEOUT},
    dispatch::Dispatcher,
    machine::{ExecutionMachine, MachineHooks, Signal, Transition},
    progress::ProgressReporter,
    queue::{Input, Step, TimerKind},
    relay::Broadcaster,
    schedule::Scheduler,
};

/// Engine of one tracked execution.
///
/// Single consumer of the execution queue: [`Execution::handle`] is called once per
/// input, in arrival order, until it returns [`Step::Finish`].
pub struct Execution<S> {
    request: ExecutionRequest,
    machine: ExecutionMachine,
    dispatcher: Dispatcher,
    relay: Arc<dyn Broadcaster>,
    reporter: Arc<dyn ProgressReporter>,
    tracker: Tracker<S>,
}

impl<S: Scheduler> Execution<S> {
    pub fn new(
        request: ExecutionRequest,
        settings: ExecutionSettings,
        relay: Arc<dyn Broadcaster>,
        reporter: Arc<dyn ProgressReporter>,
        scheduler: S,
    ) -> Self {
        let waiting_timeout = clamp_waiting_timeout(request.waiting_timeout());

        let tracker = Tracker {
            scheduler,
            reporter: Arc::clone(&reporter),
            subject: request.subject().to_string(),
            command_line: request.command_line(),
            waiting_timeout,
            pending_timeout: request.pending_timeout(),
            failure_grace: settings.failure_grace,
            outcome: None,
            finish_now: false,
        };

        Self {
            dispatcher: Dispatcher::new(request.tracking_id().clone()),
            machine: ExecutionMachine::new().with_rearm(settings.pending_rearm),
            request,
            relay,
            reporter,
            tracker,
        }
    }

    /// Arm the waiting timer.
    pub fn start(&self) {
        debug!(
            tracking_id = %self.request.tracking_id(),
            waiting_s = self.tracker.waiting_timeout.as_secs(),
            rearm = ?self.machine.rearm(),
            "execution started"
        );
        self.tracker
            .scheduler
            .schedule(self.tracker.waiting_timeout, TimerKind::WaitingTimeout);
    }

    pub fn state(&self) -> ExecState {
        self.machine.state()
    }

    /// Outcome, once decided. Never changes afterwards.
    pub fn outcome(&self) -> Option<ExitOutcome> {
        self.tracker.outcome
    }

    pub fn waiting_timeout(&self) -> Duration {
        self.tracker.waiting_timeout
    }

    pub fn handle(&mut self, input: Input) -> Step {
        if let Some(outcome) = self.tracker.outcome {
            return self.handle_terminated(outcome, input);
        }

        match input {
            Input::SessionOpened => self.publish(),
            Input::Event { event, .. } => self.dispatch(&event),
            Input::Timer(TimerKind::WaitingTimeout) => {
                self.fire_timer(Signal::WaitingTimeout, TimerKind::WaitingTimeout)
            }
            Input::Timer(TimerKind::PendingTimeout) => {
                self.fire_timer(Signal::PendingTimeout, TimerKind::PendingTimeout)
            }
            Input::Timer(kind) => trace!(%kind, "timer not used by executions"),
        }

        self.tracker.step()
    }

    fn handle_terminated(&self, outcome: ExitOutcome, input: Input) -> Step {
        match input {
            Input::Timer(TimerKind::Stop) => return Step::Finish(outcome),
            Input::Event { event, .. } => {
                self.dispatcher.report_stragglers(&event);
            }
            other => trace!(?other, "ignored after termination"),
        }
        Step::Continue
    }

    fn publish(&mut self) {
        let (target, cmd) = (self.request.target(), self.request.command());
        debug!("Publishing execution request : execute {cmd} on {target}");

        let message = format!("Execute {cmd} on {target}.");
        if let Err(e) = self.machine.fire(Signal::Request, message, &mut self.tracker) {
            debug!(error = %e, "request not published");
            return;
        }

        if let Err(e) =
            self.relay
                .publish_request_for_target(target, cmd, self.request.arguments())
        {
            error!(error = %e, "failed to publish execution request");
        }
    }

    fn dispatch(&mut self, event: &Value) {
        self.dispatcher.handle(
            event,
            &mut self.machine,
            &mut self.tracker,
            self.reporter.as_ref(),
        );
    }

    fn fire_timer(&mut self, signal: Signal, kind: TimerKind) {
        if let Err(e) = self.machine.fire(signal, kind.as_str(), &mut self.tracker) {
            debug!(error = %e, "timer ignored");
        }
    }
}

fn clamp_waiting_timeout(requested: Duration) -> Duration {
    if requested >= MIN_WAITING_TIMEOUT {
        return requested;
    }
    warn!(
        "Waiting timeout of {}s is below the minimum, using {}s",
        requested.as_secs_f64(),
        MIN_WAITING_TIMEOUT.as_secs()
    );
    MIN_WAITING_TIMEOUT
}

/// Reacts to machine transitions: timers, progress and the outcome.
struct Tracker<S> {
    scheduler: S,
    reporter: Arc<dyn ProgressReporter>,
    subject: String,
    command_line: String,
    waiting_timeout: Duration,
    pending_timeout: Duration,
    failure_grace: Duration,
    outcome: Option<ExitOutcome>,
    finish_now: bool,
}

impl<S> Tracker<S> {
    fn step(&self) -> Step {
        match self.outcome {
            Some(outcome) if self.finish_now => Step::Finish(outcome),
            _ => Step::Continue,
        }
    }

    /// Record the outcome of the terminal state `t` entered; only the first one counts.
    fn settle(&mut self, t: &Transition) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = ExitOutcome::from_state(t.to);
        self.outcome.is_some()
    }
}

impl<S: Scheduler> MachineHooks for Tracker<S> {
    fn on_waiting(&mut self, t: &Transition) {
        debug!(message = %t.message, "waiting for a receiver to start the command");
    }

    fn on_failed(&mut self, src: ExecState, _t: &Transition) {
        if src == ExecState::Waiting {
            warn!(
                "Command execution has not started yet, but got a failure event. Waiting for other receivers."
            );
        } else {
            error!("The command failed.");
        }
    }

    fn on_pending(&mut self, _t: &Transition) {
        self.reporter
            .report_progress(&format!("{} started", self.subject));
        self.scheduler
            .schedule(self.pending_timeout, TimerKind::PendingTimeout);
    }

    fn on_success(&mut self, t: &Transition) {
        if !self.settle(t) {
            return;
        }
        self.reporter
            .report_progress(&format!("{} successful", self.subject));
        info!("{} successful", self.subject);
        self.finish_now = true;
    }

    fn on_failure(&mut self, t: &Transition) {
        if !self.settle(t) {
            return;
        }
        self.reporter
            .report_progress(&format!("{} failed", self.subject));
        debug!("Waiting for possible error reports from a receiver..");
        self.scheduler.schedule(self.failure_grace, TimerKind::Stop);
    }

    fn on_waiting_timeout(&mut self, _t: &Transition) {
        error!(
            "Did not get any response from a receiver - the command \"{}\" was not started within {} seconds",
            self.command_line,
            self.waiting_timeout.as_secs()
        );
    }

    fn on_pending_timeout(&mut self, _t: &Transition) {
        error!(
            "Execution of \"{}\" started and pending, but timed out after {} seconds while waiting for it to complete.",
            self.command_line,
            self.pending_timeout.as_secs()
        );
    }
}
