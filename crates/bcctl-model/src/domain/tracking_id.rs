use std::fmt;

use serde::{Deserialize, Serialize};

/// Flag under which the tracking id travels inside the published argument list.
pub const TRACKING_ID_FLAG: &str = "--tracking-id";

/// Correlation token embedded in an outgoing request and echoed by every related event.
///
/// Opaque: it is compared for equality and never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the token as the single argument appended to a published request.
    pub fn as_argument(&self) -> String {
        format!("{TRACKING_ID_FLAG}={}", self.0)
    }

    /// Returns `true` if `candidate` carries exactly this token.
    #[inline]
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        candidate == Some(self.0.as_str())
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TrackingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TrackingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
