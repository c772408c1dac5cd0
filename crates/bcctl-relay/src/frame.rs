use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    /// Receive every event published for `target`.
    Subscribe { target: String },
    /// Ask the receivers of `target` to run `cmd`.
    Request {
        target: String,
        cmd: String,
        args: Vec<String>,
    },
}

impl OutboundFrame {
    /// JSON line, newline included.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Event fanned in by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub target: String,
    pub event: Value,
}

impl InboundFrame {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
