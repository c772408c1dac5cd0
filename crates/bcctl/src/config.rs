use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bcctl_core::{DEFAULT_BROADCASTER_HOST, DEFAULT_BROADCASTER_PORT};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "/etc/bcctl/controller.toml";

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of the configuration file.
///
/// ```toml
/// [broadcaster]
/// host = "broadcaster.domain.tld"
/// port = 8081
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub broadcaster: BroadcasterSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BroadcasterSection {
    pub host: String,
    /// Signed so that invalid values are reported by port validation.
    pub port: i64,
}

impl Default for BroadcasterSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_BROADCASTER_HOST.to_string(),
            port: i64::from(DEFAULT_BROADCASTER_PORT),
        }
    }
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn read(path: &Path) -> Result<Self, CliConfigError> {
        let content = fs::read_to_string(path).map_err(|source| CliConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| CliConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path`, falling back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => {
                debug!(path = %path.display(), "configuration loaded");
                config
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Relay address with command line overrides applied.
    pub fn broadcaster(&self, host: Option<String>, port: Option<i64>) -> (String, i64) {
        (
            host.unwrap_or_else(|| self.broadcaster.host.clone()),
            port.unwrap_or(self.broadcaster.port),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_broadcaster_section() {
        let cfg = FileConfig::from_toml(
            r#"
            [broadcaster]
            host = "broadcaster.domain.tld"
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(cfg.broadcaster.host, "broadcaster.domain.tld");
        assert_eq!(cfg.broadcaster.port, 9090);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = FileConfig::from_toml("[broadcaster]\nport = 1234\n").unwrap();
        assert_eq!(cfg.broadcaster.host, "localhost");
        assert_eq!(cfg.broadcaster.port, 1234);

        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/bcctl/controller.toml");
        assert!(matches!(
            FileConfig::read(path),
            Err(CliConfigError::Read { .. })
        ));

        let cfg = FileConfig::load_or_default(path);
        assert_eq!(cfg.broadcaster(None, None), ("localhost".to_string(), 8081));
    }

    #[test]
    fn wrong_typed_port_is_a_parse_error() {
        assert!(FileConfig::from_toml("[broadcaster]\nport = \"eighty\"\n").is_err());
    }

    #[test]
    fn command_line_wins_over_file() {
        let cfg = FileConfig::from_toml("[broadcaster]\nhost = \"file\"\nport = 1\n").unwrap();

        assert_eq!(cfg.broadcaster(None, None), ("file".to_string(), 1));
        assert_eq!(
            cfg.broadcaster(Some("cli".into()), Some(2)),
            ("cli".to_string(), 2)
        );
    }
}
