// Turns parsed records back into lock file text.
// Output parses back to the same records, so `fmt` is safe to run in place.

use crate::models::{ExcludedPin, Manifest, ManifestLine, RequirementRecord};
use serde::{Deserialize, Serialize};

/// Header pip-compile writes above commented-out pins
pub const EXCLUDED_HEADER: &str =
    "# The following packages are considered to be unsafe in a requirements file:";

/// How rendered lines are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Column the inline `#` is aligned to
    #[serde(default = "default_comment_column")]
    pub comment_column: usize,
}

fn default_comment_column() -> usize {
    48 // where pip-compile puts its "# via" annotations
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            comment_column: default_comment_column(),
        }
    }
}

/// Render a single requirement as one line, without trailing newline
pub fn render_line(record: &RequirementRecord, options: &RenderOptions) -> String {
    let mut spec = format!("{}=={}", record.name(), record.version());
    if let Some(marker) = record.marker() {
        spec.push_str("; ");
        spec.push_str(marker);
    }

    with_comment(spec, record.origin_comment(), options)
}

fn render_excluded(pin: &ExcludedPin, options: &RenderOptions) -> String {
    let mut spec = format!("# {}", pin.name());
    if let Some(version) = pin.version() {
        spec.push_str("==");
        spec.push_str(version);
    }

    with_comment(spec, pin.origin_comment(), options)
}

fn with_comment(mut spec: String, comment: Option<&str>, options: &RenderOptions) -> String {
    let Some(comment) = comment else {
        return spec;
    };

    let padding = options
        .comment_column
        .saturating_sub(spec.chars().count())
        .max(2);
    spec.extend(std::iter::repeat(' ').take(padding));
    spec.push_str("# ");
    spec.push_str(comment);
    spec
}

/// Render requirements, one per line, in the given order
pub fn render_requirements(records: &[RequirementRecord], options: &RenderOptions) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&render_line(record, options));
        output.push('\n');
    }
    output
}

/// Render a whole manifest line by line
///
/// Comments and blank lines come back verbatim; requirements and excluded
/// pins are re-laid out with aligned comments.
pub fn render_manifest(manifest: &Manifest, options: &RenderOptions) -> String {
    let mut output = String::new();

    for line in manifest.lines() {
        match line {
            ManifestLine::Requirement(idx) => {
                output.push_str(&render_line(&manifest.requirements()[*idx], options))
            }
            ManifestLine::Excluded(idx) => {
                output.push_str(&render_excluded(&manifest.excluded()[*idx], options))
            }
            ManifestLine::Comment(text) => output.push_str(text),
            ManifestLine::Blank => {}
        }
        output.push('\n');
    }

    output
}
