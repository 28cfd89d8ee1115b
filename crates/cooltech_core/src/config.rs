//! Edit session configuration.
//!
//! # Responsibility
//! - Hold the tunables of an edit session (revision baseline, notice, routes).
//! - Load them from a JSON file with defaults for missing keys.
//!
//! # Invariants
//! - Unknown keys are rejected so typos do not silently fall back.
//! - A loaded config is always validated.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASELINE_REVISION: i64 = 0;
const DEFAULT_NOTICE_DURATION_MS: u64 = 2000;
const DEFAULT_NOTICE_MESSAGE: &str = "User successfully updated.";
const DEFAULT_UNAUTHENTICATED_ROUTE: &str = "/";
const DEFAULT_NON_ADMIN_ROUTE: &str = "/user-page";

/// Errors loading JSON configuration or snapshot files.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Parse(err) => write!(f, "invalid json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tunables for one edit session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Revision marker submitted regardless of the server-assigned value.
    pub baseline_revision: i64,
    /// How long the success notice stays visible.
    pub notice_duration_ms: u64,
    pub notice_message: String,
    /// Route used when the backend answers unauthorized.
    pub unauthenticated_route: String,
    /// Route used when a non-admin caller opens the editor.
    pub non_admin_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baseline_revision: DEFAULT_BASELINE_REVISION,
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
            notice_message: DEFAULT_NOTICE_MESSAGE.to_string(),
            unauthenticated_route: DEFAULT_UNAUTHENTICATED_ROUTE.to_string(),
            non_admin_route: DEFAULT_NON_ADMIN_ROUTE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = read_file(path.as_ref())?;
        Self::from_json_str(raw.as_str())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notice_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "notice_duration_ms must be greater than zero".to_string(),
            ));
        }
        for (key, route) in [
            ("unauthenticated_route", &self.unauthenticated_route),
            ("non_admin_route", &self.non_admin_route),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be an absolute route, got `{route}`"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SessionConfig};
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn missing_keys_take_defaults() {
        let config = SessionConfig::from_json_str(r#"{"baseline_revision": 3}"#).unwrap();
        assert_eq!(config.baseline_revision, 3);
        assert_eq!(config.notice_duration(), Duration::from_millis(2000));
        assert_eq!(config.non_admin_route, "/user-page");
        assert_eq!(config.unauthenticated_route, "/");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = SessionConfig::from_json_str(r#"{"notice_ms": 10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_notice_duration_and_relative_routes() {
        let err = SessionConfig::from_json_str(r#"{"notice_duration_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_json_str(r#"{"non_admin_route": "home"}"#).unwrap_err();
        assert!(err.to_string().contains("non_admin_route"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"notice_message": "Saved."}}"#).unwrap();

        let config = SessionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.notice_message, "Saved.");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = SessionConfig::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
