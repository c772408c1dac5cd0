use crate::logger::{format::LoggerFormat, level::LoggerLevel};

/// How the controller writes its diagnostics.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    /// Prefix each line with the emitting module.
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Color follows whether stderr is a terminal.
    pub fn new(format: LoggerFormat, level: LoggerLevel) -> Self {
        Self {
            format,
            level,
            with_targets: false,
            use_color: atty::is(atty::Stream::Stderr),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new(LoggerFormat::Text, LoggerLevel::default())
    }
}
