use std::time::Duration;

use bcctl_model::Target;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::InfoError;

pub const DEFAULT_INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// `GET http://<host>:<port>/api/v1/targets/<target>/full`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfoEndpoint {
    target: Target,
    host: String,
    port: u16,
}

impl TargetInfoEndpoint {
    pub fn new(target: impl Into<Target>, host: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "http://{}:{}/api/v1/targets/{}/full",
            self.host, self.port, self.target
        )
    }

    /// Fetch the response body; anything but `200 OK` is an error.
    pub async fn fetch(&self, timeout: Duration) -> Result<String, InfoError> {
        let url = self.url();
        debug!("Fetching info from {url}");

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let response = client.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InfoError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
