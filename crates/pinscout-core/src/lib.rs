// Core plumbing around the lock file parser: loading, config, export
pub mod config;
pub mod error;
pub mod export;
pub mod loader;

pub use config::Config;
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use loader::{load_manifest, read_manifest};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
