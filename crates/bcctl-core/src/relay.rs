use async_trait::async_trait;
use bcctl_model::Target;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::queue::Input;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("relay i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("relay session is not open")]
    NotConnected,

    #[error("relay connection closed")]
    Closed,
}

/// Client side of the publish/subscribe relay.
///
/// `connect` runs for the lifetime of the session: it reports the session as open
/// through the sink, then feeds every event it receives for the subscribed target into
/// it. Publishing does not block; frames are queued to the running session.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn connect(&self, sink: EventSink) -> Result<(), RelayError>;

    fn publish_request_for_target(
        &self,
        target: &str,
        cmd: &str,
        args: &[String],
    ) -> Result<(), RelayError>;
}

/// Handle through which a relay hands its traffic to an execution.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Input>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<Input>) -> Self {
        Self { tx }
    }

    /// Returns `false` once the execution stopped listening.
    pub fn session_opened(&self) -> bool {
        self.tx.send(Input::SessionOpened).is_ok()
    }

    /// Returns `false` once the execution stopped listening.
    pub fn deliver(&self, target: impl Into<Target>, event: Value) -> bool {
        self.tx
            .send(Input::Event {
                target: target.into(),
                event,
            })
            .is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
