use thiserror::Error;

/// Result type for lock file parsing
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Everything that makes a lock file unacceptable
///
/// Both variants are fatal: a half-parsed lock file is worse than none.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Malformed line {line}: {reason} (`{text}`)")]
    MalformedLine {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("Duplicate requirement `{name}` on line {line} (first pinned on line {first_line})")]
    DuplicateRequirement {
        name: String,
        first_line: usize,
        line: usize,
    },
}

impl ManifestError {
    /// 1-based line number the error points at
    pub fn line(&self) -> usize {
        match self {
            ManifestError::MalformedLine { line, .. } => *line,
            ManifestError::DuplicateRequirement { line, .. } => *line,
        }
    }
}
