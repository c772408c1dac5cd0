mod execution;
pub use execution::Execution;

mod info;
pub use info::InfoWatch;

use std::{io::Write, sync::Arc, time::Duration};

use bcctl_model::{ExecutionRequest, ExitOutcome, Target};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::{
    config::RelayEndpoint,
    error::ConfigError,
    machine::PendingRearm,
    progress::ProgressReporter,
    queue::{Input, Step},
    relay::{Broadcaster, EventSink},
    schedule::TokioScheduler,
    tracking::TrackingIdGenerator,
};

/// Lower bound for the waiting timeout.
pub const MIN_WAITING_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_FAILURE_GRACE: Duration = Duration::from_secs(10);

/// Engine tuning shared by all executions of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Time allowed for straggler error reports after a failure.
    pub failure_grace: Duration,
    pub pending_rearm: PendingRearm,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            failure_grace: DEFAULT_FAILURE_GRACE,
            pending_rearm: PendingRearm::default(),
        }
    }
}

/// Entry point for execution and info requests against one target.
#[derive(Debug, Clone)]
pub struct ExecutionController {
    endpoint: RelayEndpoint,
    target: Target,
    settings: ExecutionSettings,
}

impl ExecutionController {
    /// Validate the relay address and target; nothing touches the network yet.
    pub fn new(
        host: impl Into<String>,
        port: i64,
        target: impl Into<Target>,
    ) -> Result<Self, ConfigError> {
        let endpoint = RelayEndpoint::new(host, port)?;
        let target = target.into();
        if target.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        Ok(Self {
            endpoint,
            target,
            settings: ExecutionSettings::default(),
        })
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn endpoint(&self) -> &RelayEndpoint {
        &self.endpoint
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn settings(&self) -> ExecutionSettings {
        self.settings
    }

    /// Build a request for `command` with a fresh tracking id.
    pub fn prepare<I, S>(
        &self,
        tracking: &TrackingIdGenerator,
        command: impl Into<String>,
        arguments: I,
        waiting_timeout: Duration,
        pending_timeout: Duration,
    ) -> ExecutionRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExecutionRequest::new(
            self.target.clone(),
            command,
            arguments,
            tracking.generate(&self.target),
        )
        .with_waiting_timeout(waiting_timeout)
        .with_pending_timeout(pending_timeout)
    }

    /// Publish `request` and follow it until it succeeds, fails or times out.
    #[instrument(level = "debug", skip_all, fields(exec_target = %self.target, tracking_id = %request.tracking_id()))]
    pub async fn run_execution(
        &self,
        request: ExecutionRequest,
        relay: Arc<dyn Broadcaster>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> ExitOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx.clone());

        let mut execution = Execution::new(
            request,
            self.settings,
            Arc::clone(&relay),
            reporter,
            scheduler.clone(),
        );
        execution.start();

        let connector = spawn_connect(relay, EventSink::new(tx));
        let outcome = pump(&mut rx, |input| execution.handle(input)).await;

        scheduler.shutdown();
        connector.abort();
        outcome
    }

    /// Print the first event seen for the target to `out`, or fail after `timeout`.
    #[instrument(level = "debug", skip_all, fields(exec_target = %self.target))]
    pub async fn run_info<W: Write>(
        &self,
        timeout: Duration,
        relay: Arc<dyn Broadcaster>,
        out: W,
    ) -> ExitOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx.clone());

        let mut watch = InfoWatch::new(self.target.clone(), timeout, out);
        watch.start(&scheduler);

        let connector = spawn_connect(relay, EventSink::new(tx));
        let outcome = pump(&mut rx, |input| watch.handle(input)).await;

        scheduler.shutdown();
        connector.abort();
        outcome
    }
}

fn spawn_connect(relay: Arc<dyn Broadcaster>, sink: EventSink) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match relay.connect(sink).await {
            Ok(()) => info!("relay session closed"),
            Err(e) => error!(error = %e, "relay session failed"),
        }
    })
}

async fn pump<F>(rx: &mut mpsc::UnboundedReceiver<Input>, mut handle: F) -> ExitOutcome
where
    F: FnMut(Input) -> Step,
{
    while let Some(input) = rx.recv().await {
        if let Step::Finish(outcome) = handle(input) {
            return outcome;
        }
    }
    error!("execution queue closed before an outcome was reached");
    ExitOutcome::Failure
}
