use thiserror::Error;

/// Invalid controller configuration, detected before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be greater than 0, got {0}")]
    PortNegative(i64),
    #[error("port {0} out of range, use port between 0 and 65535")]
    PortOutOfRange(i64),
    #[error("broadcaster host must not be empty")]
    EmptyHost,
    #[error("target must not be empty")]
    EmptyTarget,
}
