use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CallInfo, EventError, ServiceChange};

/// Event id of command lifecycle events.
pub const EVENT_CMD: &str = "cmd";
/// Event id announcing which host runs the command and where it logs.
pub const EVENT_CALL_INFO: &str = "call-info";
/// Event id announcing service state changes on the target.
pub const EVENT_SERVICE_CHANGE: &str = "service-change";
/// State label reported by a receiver when the command failed.
pub const STATE_FAILED: &str = "failed";

/// Status event published by a remote receiver.
///
/// Only `id` is mandatory. `payload` is kept as raw JSON and interpreted lazily:
/// a payload that does not have the expected shape only disables the enrichment
/// that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

impl Event {
    /// Minimal event carrying only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: None,
            tracking_id: None,
            payload: None,
            message: None,
            target: None,
            host: None,
            log_file: None,
            cmd: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Interpret a raw relay event.
    pub fn from_value(value: &Value) -> Result<Self, EventError> {
        Event::deserialize(value).map_err(|e| EventError::Malformed(e.to_string()))
    }

    /// Tracking id of a raw event, without interpreting the rest of it.
    ///
    /// Non-string tracking ids are treated as absent.
    pub fn raw_tracking_id(value: &Value) -> Option<&str> {
        value.get("tracking_id").and_then(Value::as_str)
    }

    /// One-line description: id, command, state and flattened payload.
    ///
    /// A payload that cannot be flattened is left out.
    pub fn describe(&self) -> String {
        let payload = self.flattened_payload().ok().flatten();
        [
            Some(self.id.as_str()),
            self.cmd.as_deref(),
            self.state.as_deref(),
            payload.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Payload entries rendered as space-separated `key=value` pairs.
    ///
    /// `Ok(None)` when there is no (or an empty) payload.
    pub fn flattened_payload(&self) -> Result<Option<String>, EventError> {
        let entries = match self.payload_entries()? {
            Some(entries) => entries,
            None => return Ok(None),
        };

        let mut pairs = Vec::new();
        for entry in entries {
            let map = entry
                .as_object()
                .ok_or_else(|| EventError::InvalidPayload(format!("entry is not a map: {entry}")))?;
            for (key, value) in map {
                pairs.push(format!("{key}={}", render(value)));
            }
        }
        Ok(Some(pairs.join(" ")))
    }

    /// `true` for a failed `cmd` event that carries a non-empty message.
    pub fn is_error_report(&self) -> bool {
        self.id == EVENT_CMD
            && self.state.as_deref() == Some(STATE_FAILED)
            && self.message.as_deref().is_some_and(|m| !m.is_empty())
    }

    /// Lines of an error report, `None` if this event is not one.
    pub fn error_report_lines(&self) -> Option<Vec<&str>> {
        if !self.is_error_report() {
            return None;
        }
        self.message.as_deref().map(|m| m.split('\n').collect())
    }

    pub fn is_call_info(&self) -> bool {
        self.id == EVENT_CALL_INFO
    }

    /// Execution location announced by a `call-info` event.
    pub fn call_info(&self) -> Option<CallInfo> {
        if !self.is_call_info() {
            return None;
        }
        Some(CallInfo {
            target: self.target.clone(),
            host: self.host.clone(),
            log_file: self.log_file.clone(),
        })
    }

    /// Service changes announced by a `service-change` event.
    ///
    /// Empty for other events and for events without payload. An entry lacking `uri` or
    /// `state` is dropped on its own; only a payload that is not a list fails.
    pub fn service_changes(&self) -> Result<Vec<ServiceChange>, EventError> {
        if self.id != EVENT_SERVICE_CHANGE {
            return Ok(Vec::new());
        }
        let entries = match self.payload_entries()? {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };
        Ok(entries
            .iter()
            .filter_map(|entry| ServiceChange::deserialize(entry).ok())
            .collect())
    }

    fn payload_entries(&self) -> Result<Option<&Vec<Value>>, EventError> {
        match &self.payload {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(entries)) if entries.is_empty() => Ok(None),
            Some(Value::Array(entries)) => Ok(Some(entries)),
            Some(other) => Err(EventError::InvalidPayload(format!(
                "expected a list of maps, got {other}"
            ))),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
