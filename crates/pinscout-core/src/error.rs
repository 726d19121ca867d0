use std::path::PathBuf;
use thiserror::Error;

/// All the ways pinscout can fail outside the parser itself
#[derive(Error, Debug)]
pub enum Error {
    /// `path` is `-` when the manifest came from stdin
    #[error("{}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: pinscout_deps::ManifestError,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// The underlying lock file error, if that's what went wrong
    pub fn manifest_error(&self) -> Option<&pinscout_deps::ManifestError> {
        match self {
            Error::Manifest { source, .. } => Some(source),
            _ => None,
        }
    }
}
