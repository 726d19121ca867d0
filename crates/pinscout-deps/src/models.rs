use crate::marker::MarkerExpr;
use crate::render::{self, RenderOptions};
use serde::{Deserialize, Serialize};

/// One pinned requirement: `name==version[; marker][  # comment]`
///
/// Built once by the parser and never mutated afterwards. `line` is where the
/// record came from and is left out of equality, so a re-rendered file
/// compares equal to the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementRecord {
    name: String,
    version: String,
    marker: Option<String>,
    origin_comment: Option<String>,
    line: usize,
}

impl PartialEq for RequirementRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.marker == other.marker
            && self.origin_comment == other.origin_comment
    }
}

impl Eq for RequirementRecord {}

impl RequirementRecord {
    pub(crate) fn new(
        name: String,
        version: String,
        marker: Option<String>,
        origin_comment: Option<String>,
        line: usize,
    ) -> Self {
        Self {
            name,
            version,
            marker,
            origin_comment,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Environment marker exactly as written (trimmed)
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Free-text annotation such as `via cryptography`
    pub fn origin_comment(&self) -> Option<&str> {
        self.origin_comment.as_deref()
    }

    /// 1-based source line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Structured marker. The parser already validated it, so this only
    /// returns `None` when there is no marker.
    pub fn marker_expr(&self) -> Option<MarkerExpr> {
        self.marker
            .as_deref()
            .and_then(|m| MarkerExpr::parse(m).ok())
    }

    pub fn applicability(&self) -> Applicability {
        if self.marker.is_some() {
            Applicability::Conditional
        } else {
            Applicability::Always
        }
    }

    /// Name used for duplicate detection and lookups
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl std::fmt::Display for RequirementRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render::render_line(self, &RenderOptions::default()))
    }
}

/// Whether a requirement is gated by an environment marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Applicability {
    Always,      // No marker
    Conditional, // Gated by a python_version marker
}

impl std::fmt::Display for Applicability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicability::Always => write!(f, "always"),
            Applicability::Conditional => write!(f, "conditional"),
        }
    }
}

/// A package pip-compile left out on purpose and wrote as a comment,
/// e.g. `# setuptools                # via cryptography, tldextract`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedPin {
    name: String,
    version: Option<String>,
    origin_comment: Option<String>,
    line: usize,
}

impl PartialEq for ExcludedPin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.origin_comment == other.origin_comment
    }
}

impl Eq for ExcludedPin {}

impl ExcludedPin {
    pub(crate) fn new(
        name: String,
        version: Option<String>,
        origin_comment: Option<String>,
        line: usize,
    ) -> Self {
        Self {
            name,
            version,
            origin_comment,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn origin_comment(&self) -> Option<&str> {
        self.origin_comment.as_deref()
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// One source line of a manifest, in file order
///
/// Requirement and excluded entries index into the manifest's lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestLine {
    Requirement(usize),
    Excluded(usize),
    Comment(String), // kept verbatim, trailing whitespace trimmed
    Blank,
}

/// A fully parsed lock file, requirements in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    requirements: Vec<RequirementRecord>,
    excluded: Vec<ExcludedPin>,
    #[serde(default)]
    layout: Vec<ManifestLine>,
}

impl Manifest {
    pub(crate) fn new(
        requirements: Vec<RequirementRecord>,
        excluded: Vec<ExcludedPin>,
        layout: Vec<ManifestLine>,
    ) -> Self {
        Self {
            requirements,
            excluded,
            layout,
        }
    }

    /// Every source line, comments and blanks included
    pub fn lines(&self) -> &[ManifestLine] {
        &self.layout
    }

    /// Comment lines that aren't excluded pins, as written
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.layout.iter().filter_map(|line| match line {
            ManifestLine::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn requirements(&self) -> &[RequirementRecord] {
        &self.requirements
    }

    pub fn excluded(&self) -> &[ExcludedPin] {
        &self.excluded
    }

    pub fn into_requirements(self) -> Vec<RequirementRecord> {
        self.requirements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequirementRecord> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Look a requirement up by name, ignoring case and `-`/`_`/`.` spelling
    pub fn get(&self, name: &str) -> Option<&RequirementRecord> {
        let wanted = normalize_name(name);
        self.requirements
            .iter()
            .find(|r| r.normalized_name() == wanted)
    }

    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary::new(self)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a RequirementRecord;
    type IntoIter = std::slice::Iter<'a, RequirementRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

/// Counts over a parsed manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub total_count: usize,
    pub unconditional_count: usize,
    pub conditional_count: usize,
    pub annotated_count: usize,
    pub excluded_count: usize,
}

impl ManifestSummary {
    pub fn new(manifest: &Manifest) -> Self {
        let requirements = manifest.requirements();
        let conditional_count = requirements
            .iter()
            .filter(|r| r.applicability() == Applicability::Conditional)
            .count();
        let annotated_count = requirements
            .iter()
            .filter(|r| r.origin_comment().is_some())
            .count();
        let total_count = requirements.len();

        Self {
            total_count,
            unconditional_count: total_count - conditional_count,
            conditional_count,
            annotated_count,
            excluded_count: manifest.excluded().len(),
        }
    }
}

/// Canonical package name: lower-case, runs of `-`, `_` and `.` become `-`
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_manifest;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("requests"), "requests");
        assert_eq!(normalize_name("Requests-File"), "requests-file");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("Foo__Bar-.baz"), "foo-bar-baz");
    }

    #[test]
    fn test_equality_ignores_line() {
        let a = RequirementRecord::new("six".into(), "1.10.0".into(), None, None, 3);
        let b = RequirementRecord::new("six".into(), "1.10.0".into(), None, None, 17);
        assert_eq!(a, b);

        let c = RequirementRecord::new(
            "six".into(),
            "1.10.0".into(),
            None,
            Some("via requests".into()),
            3,
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_applicability() {
        let plain = RequirementRecord::new("idna".into(), "2.2".into(), None, None, 1);
        let gated = RequirementRecord::new(
            "ipaddress".into(),
            "1.0.18".into(),
            Some("python_version < '3.3'".into()),
            None,
            2,
        );
        assert_eq!(plain.applicability(), Applicability::Always);
        assert_eq!(gated.applicability(), Applicability::Conditional);
        assert_eq!(gated.applicability().to_string(), "conditional");
        assert_eq!(gated.marker_expr().unwrap().version(), "3.3");
        assert!(plain.marker_expr().is_none());
    }

    #[test]
    fn test_manifest_lookup_and_summary() {
        let content = "\
idna==2.2                         # via cryptography
ipaddress==1.0.18; python_version < '3.3'
requests-file==1.4.1

# The following packages are considered to be unsafe in a requirements file:
# setuptools                      # via cryptography
";
        let manifest = parse_manifest(content).unwrap();

        assert_eq!(manifest.get("Requests_File").unwrap().version(), "1.4.1");
        assert!(manifest.get("requests").is_none());

        let summary = manifest.summary();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.unconditional_count, 2);
        assert_eq!(summary.conditional_count, 1);
        assert_eq!(summary.annotated_count, 1);
        assert_eq!(summary.excluded_count, 1);
    }

    #[test]
    fn test_record_serializes_optional_fields_as_null() {
        let record = RequirementRecord::new("six".into(), "1.10.0".into(), None, None, 1);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "six");
        assert!(json["marker"].is_null());
        assert!(json["origin_comment"].is_null());
    }
}
