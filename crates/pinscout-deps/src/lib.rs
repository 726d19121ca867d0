// Lock file analysis module
// Parses, validates and re-renders pinned requirements files (pip-compile output)

pub mod error;
pub mod marker;
pub mod models;
pub mod parsers;
pub mod render;

pub use error::{ManifestError, Result};
pub use marker::{Comparator, InvalidMarker, MarkerExpr};
pub use models::{
    normalize_name, Applicability, ExcludedPin, Manifest, ManifestLine, ManifestSummary,
    RequirementRecord,
};
pub use parsers::{parse_manifest, parse_requirements};
pub use render::{render_manifest, render_requirements, RenderOptions};
