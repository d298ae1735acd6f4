//! Content loading error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the content directory.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read content file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid JSON in `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("Required content file `{0}` not found")]
    Missing(PathBuf),

    #[error("Duplicate {kind} `{id}` in `{file}`")]
    Duplicate {
        kind: &'static str,
        id: String,
        file: PathBuf,
    },
}
