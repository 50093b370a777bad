//! Error types for API index loading and settings.
//!
//! Nothing here is fatal to the server: the repository logs these and
//! degrades to "no data for this source".  They exist so the low-level
//! readers can report *why* a source was skipped.
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read one API index source or class document.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The expected file does not exist under the search path.
    #[error("{} does not exist", path.display())]
    Missing { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not the expected JSON shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IndexError {
    /// `true` for the "file absent" case, which is logged more quietly
    /// than a broken file.
    pub fn is_missing(&self) -> bool {
        matches!(self, IndexError::Missing { .. })
    }
}

/// Failure to load settings from a config file or a JSON settings payload.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid settings payload: {0}")]
    Json(#[from] serde_json::Error),
}
