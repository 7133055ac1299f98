use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures that are fatal for one character's import or export.
///
/// Unknown vocabulary never ends up here; the normalizers fall back to
/// defaults instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("source directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("CSV has no header row for {0}")]
    Headerless(String),

    #[error("cannot parse upstream TOML {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read or write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize document: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
