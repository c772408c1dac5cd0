use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Output format of the diagnostics stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerFormat {
    #[default]
    Text,
    Json,
    /// Native systemd journal fields; Linux builds with the `journald` feature only.
    Journald,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    /// Whether this build can install the format.
    pub fn is_available(&self) -> bool {
        match self {
            LoggerFormat::Journald => cfg!(all(target_os = "linux", feature = "journald")),
            _ => true,
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    /// Case-insensitive; `journal` is accepted for `journald`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let format = [LoggerFormat::Text, LoggerFormat::Json, LoggerFormat::Journald]
            .into_iter()
            .find(|f| name.eq_ignore_ascii_case(f.as_str()))
            .or_else(|| name.eq_ignore_ascii_case("journal").then_some(LoggerFormat::Journald))
            .ok_or_else(|| LoggerError::InvalidFormat(name.to_string()))?;

        if !format.is_available() {
            return Err(LoggerError::JournaldNotSupported);
        }
        Ok(format)
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!("text".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
    }

    #[test]
    fn unknown_format_is_reported_trimmed() {
        let err = " yaml ".parse::<LoggerFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidFormat(ref s) if s == "yaml"));
        assert_eq!(
            err.to_string(),
            "unknown log format 'yaml', expected text, json or journald"
        );
    }

    #[test]
    fn display_matches_parse_names() {
        assert_eq!(LoggerFormat::Json.to_string(), "json");
        assert_eq!(LoggerFormat::default(), LoggerFormat::Text);
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_requires_feature() {
        assert!(!LoggerFormat::Journald.is_available());
        let err = "journal".parse::<LoggerFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::JournaldNotSupported));
    }

    #[cfg(all(target_os = "linux", feature = "journald"))]
    #[test]
    fn journal_is_an_alias() {
        assert_eq!(
            "Journal".parse::<LoggerFormat>().unwrap(),
            LoggerFormat::Journald
        );
    }
}
