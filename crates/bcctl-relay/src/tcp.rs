use std::sync::Mutex;

use async_trait::async_trait;
use bcctl_core::{Broadcaster, EventSink, RelayEndpoint, RelayError};
use bcctl_model::Target;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::mpsc,
};
use tracing::{debug, trace, warn};

use crate::frame::{InboundFrame, OutboundFrame};

/// Relay client over a plain TCP connection.
///
/// One session per `connect` call. Frames published while the session is down are
/// rejected with [`RelayError::NotConnected`].
pub struct TcpRelay {
    endpoint: RelayEndpoint,
    target: Target,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl TcpRelay {
    pub fn new(endpoint: RelayEndpoint, target: impl Into<Target>) -> Self {
        Self {
            endpoint,
            target: target.into(),
            outbound: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &RelayEndpoint {
        &self.endpoint
    }

    fn set_outbound(&self, tx: Option<mpsc::UnboundedSender<String>>) {
        let mut slot = match self.outbound.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = tx;
    }

    fn outbound(&self) -> Option<mpsc::UnboundedSender<String>> {
        match self.outbound.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn session(&self, stream: TcpStream, sink: &EventSink) -> Result<(), RelayError> {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut buf = Vec::new();

        let subscribe = OutboundFrame::Subscribe {
            target: self.target.clone(),
        };
        write.write_all(subscribe.to_line()?.as_bytes()).await?;
        write.flush().await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        self.set_outbound(Some(tx));
        debug!(relay = %self.endpoint, exec_target = %self.target, "relay session open");

        if !sink.session_opened() {
            return Ok(());
        }

        loop {
            tokio::select! {
                read = reader.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        return Err(RelayError::Closed);
                    }
                    let open = deliver(sink, &buf);
                    buf.clear();
                    if !open {
                        return Ok(());
                    }
                }
                Some(frame) = rx.recv() => {
                    write.write_all(frame.as_bytes()).await?;
                    write.flush().await?;
                }
            }
        }
    }
}

/// Returns `false` once the sink stopped listening.
fn deliver(sink: &EventSink, raw: &[u8]) -> bool {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => {
            warn!(error = %e, "skipping relay line that is not UTF-8");
            return true;
        }
    };
    if line.is_empty() {
        return true;
    }
    match InboundFrame::parse(line) {
        Ok(frame) => {
            trace!(exec_target = %frame.target, "relay event");
            sink.deliver(frame.target, frame.event)
        }
        Err(e) => {
            warn!(error = %e, "skipping relay line that is not an event frame");
            true
        }
    }
}

#[async_trait]
impl Broadcaster for TcpRelay {
    async fn connect(&self, sink: EventSink) -> Result<(), RelayError> {
        let addr = self.endpoint.address();
        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(source) => return Err(RelayError::Connect { addr, source }),
        };

        let result = self.session(stream, &sink).await;
        self.set_outbound(None);
        result
    }

    fn publish_request_for_target(
        &self,
        target: &str,
        cmd: &str,
        args: &[String],
    ) -> Result<(), RelayError> {
        let tx = self.outbound().ok_or(RelayError::NotConnected)?;
        let frame = OutboundFrame::Request {
            target: target.to_string(),
            cmd: cmd.to_string(),
            args: args.to_vec(),
        };
        tx.send(frame.to_line()?).map_err(|_| RelayError::Closed)
    }
}
