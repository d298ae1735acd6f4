//! Errors raised while loading or checking `relnotes.toml`.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax, an unknown key, or a value of the wrong type.
    #[error("malformed config{}", origin(.path.as_deref()))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// Well-formed, but a value the site cannot be built with.
    #[error("invalid `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

fn origin(path: Option<&Path>) -> String {
    path.map(|p| format!(" in `{}`", p.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::{error::Error as _, fs};
    use tempfile::TempDir;

    #[test]
    fn test_invalid_names_the_key() {
        let err = ConfigError::invalid("build.top_tags", "must be at least 1");
        assert_eq!(err.to_string(), "invalid `build.top_tags`: must be at least 1");
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relnotes.toml");
        fs::write(&path, "[tags.MCP]\ncolor = 7\n").unwrap();

        let err = SiteConfig::from_path(&path).unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::Parse { path: Some(_), .. }));
        assert!(err.to_string().contains("relnotes.toml"));
        // The TOML diagnostic stays reachable as the source
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_error_from_inline_text() {
        let err = SiteConfig::from_str("[base]\nunknown = 1\n").unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
        assert_eq!(err.to_string(), "malformed config");
    }

    #[test]
    fn test_read_error_keeps_io_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let err = SiteConfig::from_path(&path).unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(err.to_string().starts_with("cannot read config file"));
        assert!(err.source().unwrap().downcast_ref::<std::io::Error>().is_some());
    }
}
