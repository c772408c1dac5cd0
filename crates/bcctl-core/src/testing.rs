//! Test doubles shared by the unit tests of this crate.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    progress::ProgressReporter,
    queue::TimerKind,
    relay::{Broadcaster, EventSink, RelayError},
    schedule::Scheduler,
};

/// Records armed timers instead of running them; tests fire them by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    armed: Arc<Mutex<Vec<(Duration, TimerKind)>>>,
}

impl ManualScheduler {
    pub fn armed(&self) -> Vec<(Duration, TimerKind)> {
        self.armed.lock().unwrap().clone()
    }

    pub fn armed_kinds(&self) -> Vec<TimerKind> {
        self.armed().into_iter().map(|(_, kind)| kind).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, kind: TimerKind) {
        self.armed.lock().unwrap().push((delay, kind));
    }
}

#[derive(Debug, Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_progress(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub target: String,
    pub cmd: String,
    pub args: Vec<String>,
}

/// Opens the session on connect, then replays scripted `(target, event)` pairs.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    script: Vec<(String, Value)>,
    published: Mutex<Vec<Published>>,
    fail_publish: bool,
}

impl RecordingRelay {
    pub fn with_script(script: Vec<(String, Value)>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for RecordingRelay {
    async fn connect(&self, sink: EventSink) -> Result<(), RelayError> {
        sink.session_opened();
        for (target, event) in &self.script {
            sink.deliver(target.clone(), event.clone());
        }
        Ok(())
    }

    fn publish_request_for_target(
        &self,
        target: &str,
        cmd: &str,
        args: &[String],
    ) -> Result<(), RelayError> {
        if self.fail_publish {
            return Err(RelayError::NotConnected);
        }
        self.published.lock().unwrap().push(Published {
            target: target.to_string(),
            cmd: cmd.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }
}
