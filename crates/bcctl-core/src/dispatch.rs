use bcctl_model::{CallInfo, Event, TrackingId};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    machine::{ExecutionMachine, MachineHooks, Signal, Transition},
    progress::ProgressReporter,
};

const ERROR_REPORT_BANNER: &str = "*****Error report*****";

/// What happened to one raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Carries another execution's tracking id (or none); dropped unseen.
    Foreign,
    /// Correlated but not a valid event.
    Malformed,
    Handled {
        /// Number of error report lines logged.
        error_lines: usize,
        /// Where the command runs, for `call-info` events.
        call_info: Option<CallInfo>,
        /// Number of service changes reported as progress.
        service_changes: usize,
        /// Signal named by the event state, if it names a known one.
        signal: Option<Signal>,
        /// Transition applied to the machine, if the signal was accepted.
        transition: Option<Transition>,
    },
}

/// Filters relay events by tracking id and feeds the correlated ones to the machine.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tracking_id: TrackingId,
}

impl Dispatcher {
    pub fn new(tracking_id: TrackingId) -> Self {
        Self { tracking_id }
    }

    pub fn tracking_id(&self) -> &TrackingId {
        &self.tracking_id
    }

    /// Returns `true` if the raw event carries this execution's tracking id.
    #[inline]
    pub fn is_correlated(&self, raw: &Value) -> bool {
        self.tracking_id.matches(Event::raw_tracking_id(raw))
    }

    /// Handle one raw event.
    ///
    /// Never fails: every enrichment step degrades on its own, and only a correlated,
    /// well-formed event with a `state` may move the machine.
    pub fn handle<H: MachineHooks + ?Sized>(
        &self,
        raw: &Value,
        machine: &mut ExecutionMachine,
        hooks: &mut H,
        reporter: &dyn ProgressReporter,
    ) -> Disposition {
        if !self.is_correlated(raw) {
            log_foreign(raw);
            return Disposition::Foreign;
        }

        let event = match Event::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "Error while processing event");
                return Disposition::Malformed;
            }
        };

        debug!("Event \"{}\" received", event.describe());
        let error_lines = log_error_report(&event);
        let call_info = log_call_info(&event);
        let service_changes = report_service_changes(&event, reporter);

        let (signal, transition) = match event.state.as_deref() {
            Some(label) => apply_state(&event, label, machine, hooks),
            None => (None, None),
        };

        Disposition::Handled {
            error_lines,
            call_info,
            service_changes,
            signal,
            transition,
        }
    }

    /// Handle an event that arrived after the outcome was decided.
    ///
    /// Only error reports of correlated events are still logged. Returns the number of
    /// lines logged.
    pub fn report_stragglers(&self, raw: &Value) -> usize {
        if !self.is_correlated(raw) {
            return 0;
        }
        match Event::from_value(raw) {
            Ok(event) => log_error_report(&event),
            Err(_) => 0,
        }
    }
}

fn log_foreign(raw: &Value) {
    let id = raw.get("id").map(render).unwrap_or_default();
    let description = match raw.get("state").map(render) {
        Some(state) if !state.is_empty() => format!("{id} {state}"),
        _ => id,
    };
    let foreign = raw.get("tracking_id").map(render).unwrap_or_default();
    debug!("Ignoring event {description} with a foreign tracking ID: {foreign}.");
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn log_error_report(event: &Event) -> usize {
    let Some(lines) = event.error_report_lines() else {
        return 0;
    };
    error!("{ERROR_REPORT_BANNER}");
    for line in &lines {
        error!("{line}");
    }
    lines.len()
}

fn log_call_info(event: &Event) -> Option<CallInfo> {
    let call = event.call_info()?;
    let host = call.host.as_deref().unwrap_or("");
    info!(" Affected target: {}", call.target.as_deref().unwrap_or(""));
    info!(" Host executing the command: {host}");
    info!(
        " Logfile on {host} is at : {}",
        call.log_file.as_deref().unwrap_or("")
    );
    Some(call)
}

fn report_service_changes(event: &Event, reporter: &dyn ProgressReporter) -> usize {
    let changes = match event.service_changes() {
        Ok(changes) => changes,
        Err(e) => {
            debug!(error = %e, id = %event.id, "skipping service changes");
            return 0;
        }
    };
    for change in &changes {
        let message = change.message();
        info!("{message}");
        reporter.report_progress(&message);
    }
    changes.len()
}

fn apply_state<H: MachineHooks + ?Sized>(
    event: &Event,
    label: &str,
    machine: &mut ExecutionMachine,
    hooks: &mut H,
) -> (Option<Signal>, Option<Transition>) {
    let signal = match label.parse::<Signal>() {
        Ok(signal) => signal,
        Err(e) => {
            debug!(error = %e, id = %event.id, "ignoring event state");
            return (None, None);
        }
    };

    match machine.fire(signal, event.id.clone(), hooks) {
        Ok(t) => {
            debug!(
                "Transition from \"{}\" to \"{}\" since event \"{label}\" occurred.",
                t.from, t.to
            );
            (Some(signal), Some(t))
        }
        Err(e) => {
            debug!(error = %e, id = %event.id, "transition rejected");
            (Some(signal), None)
        }
    }
}
