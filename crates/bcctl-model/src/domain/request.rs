use std::time::Duration;

use crate::{Target, TrackingId};

const DEFAULT_WAITING_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_secs(600);

/// A command to be executed by a remote receiver on a target.
///
/// Immutable once built: the tracking id is appended to the argument list on construction
/// and travels with the published request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    target: Target,
    command: String,
    /// Caller-supplied arguments followed by the tracking id argument.
    arguments: Vec<String>,
    /// Number of caller-supplied arguments in `arguments`.
    supplied: usize,
    tracking_id: TrackingId,
    waiting_timeout: Duration,
    pending_timeout: Duration,
}

impl ExecutionRequest {
    pub fn new<I, S>(
        target: impl Into<Target>,
        command: impl Into<String>,
        arguments: I,
        tracking_id: TrackingId,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        let supplied = arguments.len();
        arguments.push(tracking_id.as_argument());

        Self {
            target: target.into(),
            command: command.into(),
            arguments,
            supplied,
            tracking_id,
            waiting_timeout: DEFAULT_WAITING_TIMEOUT,
            pending_timeout: DEFAULT_PENDING_TIMEOUT,
        }
    }

    pub fn with_waiting_timeout(mut self, timeout: Duration) -> Self {
        self.waiting_timeout = timeout;
        self
    }

    pub fn with_pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = timeout;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments as published, tracking id argument last.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Arguments as supplied by the caller, without the tracking id.
    pub fn supplied_arguments(&self) -> &[String] {
        &self.arguments[..self.supplied]
    }

    pub fn tracking_id(&self) -> &TrackingId {
        &self.tracking_id
    }

    pub fn waiting_timeout(&self) -> Duration {
        self.waiting_timeout
    }

    pub fn pending_timeout(&self) -> Duration {
        self.pending_timeout
    }

    /// Name used in progress messages: the first supplied argument, or the command.
    pub fn subject(&self) -> &str {
        self.supplied_arguments()
            .first()
            .map(String::as_str)
            .unwrap_or(&self.command)
    }

    /// Command line as shown in timeout diagnostics.
    pub fn command_line(&self) -> String {
        if self.arguments.is_empty() {
            return self.command.clone();
        }
        format!("{} {}", self.command, self.arguments.join(" "))
    }
}
