use serde::{Deserialize, Serialize};

/// A service on the target changed its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceChange {
    pub uri: String,
    pub state: String,
}

impl ServiceChange {
    /// Progress line for this change, e.g. `service://host/svc is now up.`
    pub fn message(&self) -> String {
        format!("{} is now {}.", self.uri, self.state)
    }
}

/// Where a receiver executes the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    pub target: Option<String>,
    pub host: Option<String>,
    pub log_file: Option<String>,
}
