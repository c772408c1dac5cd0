use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bcctl_core::{Broadcaster, EventSink, RelayError};
use bcctl_model::Target;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A request as published through a [`MemoryRelay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRequest {
    pub target: Target,
    pub cmd: String,
    pub args: Vec<String>,
}

type Responder = Box<dyn Fn(&PublishedRequest) -> Vec<(Target, Value)> + Send + Sync>;

/// In-process relay.
///
/// Every connected sink receives every emitted event. An optional responder plays the
/// part of the remote receivers: it is called for each published request and its events
/// are fanned out right away.
#[derive(Default)]
pub struct MemoryRelay {
    sinks: Mutex<Vec<EventSink>>,
    published: Mutex<Vec<PublishedRequest>>,
    responder: Option<Responder>,
    closed: CancellationToken,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&PublishedRequest) -> Vec<(Target, Value)> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Fan `event` out to all live sinks; returns how many received it.
    pub fn emit(&self, target: &str, event: Value) -> usize {
        let mut sinks = lock(&self.sinks);
        sinks.retain(|sink| !sink.is_closed());
        sinks
            .iter()
            .filter(|sink| sink.deliver(target, event.clone()))
            .count()
    }

    pub fn published(&self) -> Vec<PublishedRequest> {
        lock(&self.published).clone()
    }

    /// End all sessions.
    pub fn close(&self) {
        self.closed.cancel();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl Broadcaster for MemoryRelay {
    async fn connect(&self, sink: EventSink) -> Result<(), RelayError> {
        if self.closed.is_cancelled() {
            return Err(RelayError::Closed);
        }
        lock(&self.sinks).push(sink.clone());
        sink.session_opened();

        self.closed.cancelled().await;
        Ok(())
    }

    fn publish_request_for_target(
        &self,
        target: &str,
        cmd: &str,
        args: &[String],
    ) -> Result<(), RelayError> {
        if self.closed.is_cancelled() {
            return Err(RelayError::Closed);
        }
        let request = PublishedRequest {
            target: target.to_string(),
            cmd: cmd.to_string(),
            args: args.to_vec(),
        };
        trace!(exec_target = %request.target, cmd = %request.cmd, "request published");

        let responses = match &self.responder {
            Some(responder) => responder(&request),
            None => Vec::new(),
        };
        lock(&self.published).push(request);

        for (target, event) in responses {
            self.emit(&target, event);
        }
        Ok(())
    }
}
