use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_BROADCASTER_HOST: &str = "localhost";
pub const DEFAULT_BROADCASTER_PORT: u16 = 8081;

/// Validated address of the broadcast relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    host: String,
    port: u16,
}

impl RelayEndpoint {
    /// Validate host and port.
    ///
    /// The port is taken as a wide signed integer so that out-of-range values coming from
    /// the command line or a configuration file are rejected here rather than truncated.
    pub fn new(host: impl Into<String>, port: i64) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if port < 0 {
            return Err(ConfigError::PortNegative(port));
        }
        let port = u16::try_from(port).map_err(|_| ConfigError::PortOutOfRange(port))?;
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, suitable for socket connects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_BROADCASTER_HOST.to_string(),
            port: DEFAULT_BROADCASTER_PORT,
        }
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
