use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// `python_version <op> 'x.y.z'`, quotes may be single or double
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^python_version\s*(===|==|!=|<=|>=|~=|<|>)\s*(?:'([^'"]*)'|"([^'"]*)")$"#)
        .unwrap()
});

/// Marker versions may use a trailing wildcard (`2.7.*`)
static MARKER_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+!*-]*$").unwrap());

/// Marker text that doesn't fit `python_version <op> '<version>'`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid environment marker `{marker}`: {reason}")]
pub struct InvalidMarker {
    pub marker: String,
    pub reason: String,
}

/// Version comparison operators allowed in a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Lt,         // <
    Le,         // <=
    Gt,         // >
    Ge,         // >=
    Eq,         // ==
    Ne,         // !=
    Compatible, // ~=
    Arbitrary,  // ===
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Compatible => "~=",
            Comparator::Arbitrary => "===",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Comparator::Lt),
            "<=" => Ok(Comparator::Le),
            ">" => Ok(Comparator::Gt),
            ">=" => Ok(Comparator::Ge),
            "==" => Ok(Comparator::Eq),
            "!=" => Ok(Comparator::Ne),
            "~=" => Ok(Comparator::Compatible),
            "===" => Ok(Comparator::Arbitrary),
            other => Err(format!("unknown comparator `{}`", other)),
        }
    }
}

/// Structured form of an interpreter-version marker
///
/// Only validated and exposed here. Deciding whether a marker holds for a
/// given interpreter is the installer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerExpr {
    comparator: Comparator,
    version: String,
}

impl MarkerExpr {
    /// The only marker variable the lock format uses
    pub const VARIABLE: &'static str = "python_version";

    pub fn parse(text: &str) -> Result<Self, InvalidMarker> {
        let text = text.trim();
        let invalid = |reason: &str| InvalidMarker {
            marker: text.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(invalid("marker is empty"));
        }
        if !text.starts_with(Self::VARIABLE) {
            return Err(invalid("only `python_version` markers are supported"));
        }

        let caps = MARKER_RE
            .captures(text)
            .ok_or_else(|| invalid("expected `python_version <op> '<version>'`"))?;

        let comparator = caps[1].parse::<Comparator>().map_err(|e| invalid(e.as_str()))?;
        let version = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        if !MARKER_VERSION_RE.is_match(version) {
            return Err(invalid("quoted version is not a valid version"));
        }

        Ok(Self {
            comparator,
            version: version.to_string(),
        })
    }

    pub fn variable(&self) -> &'static str {
        Self::VARIABLE
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Version without its quotes
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for MarkerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", Self::VARIABLE, self.comparator, self.version)
    }
}

impl FromStr for MarkerExpr {
    type Err = InvalidMarker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_quoted_marker() {
        let marker = MarkerExpr::parse("python_version < '2.7.9'").unwrap();
        assert_eq!(marker.variable(), "python_version");
        assert_eq!(marker.comparator(), Comparator::Lt);
        assert_eq!(marker.version(), "2.7.9");
    }

    #[test]
    fn test_parse_double_quoted_without_spaces() {
        let marker = MarkerExpr::parse(r#"python_version>="3.6""#).unwrap();
        assert_eq!(marker.comparator(), Comparator::Ge);
        assert_eq!(marker.version(), "3.6");
        assert_eq!(marker.to_string(), "python_version >= '3.6'");
    }

    #[test]
    fn test_longest_comparator_wins() {
        assert_eq!(
            MarkerExpr::parse("python_version === '2.7'").unwrap().comparator(),
            Comparator::Arbitrary
        );
        assert_eq!(
            MarkerExpr::parse("python_version <= '2.7'").unwrap().comparator(),
            Comparator::Le
        );
        assert_eq!(
            MarkerExpr::parse("python_version ~= '2.7'").unwrap().comparator(),
            Comparator::Compatible
        );
    }

    #[test]
    fn test_wildcard_version() {
        let marker = MarkerExpr::parse("python_version == '2.7.*'").unwrap();
        assert_eq!(marker.version(), "2.7.*");
    }

    #[test]
    fn test_rejects_bad_markers() {
        assert!(MarkerExpr::parse("").is_err());
        assert!(MarkerExpr::parse("sys_platform == 'win32'").is_err());
        assert!(MarkerExpr::parse("python_version < 2.7").is_err());
        assert!(MarkerExpr::parse("python_version < '2.7\"").is_err());
        assert!(MarkerExpr::parse("python_version < ''").is_err());
        assert!(MarkerExpr::parse("python_version < '2.7' and python_version > '2.6'").is_err());
        assert!(MarkerExpr::parse("python_version <> '2.7'").is_err());
    }

    #[test]
    fn test_invalid_marker_message() {
        let err = MarkerExpr::parse("os_name == 'nt'").unwrap_err();
        assert_eq!(err.marker, "os_name == 'nt'");
        assert!(err.to_string().contains("python_version"));
    }

    #[test]
    fn test_comparator_round_trip_through_str() {
        for op in ["<", "<=", ">", ">=", "==", "!=", "~=", "==="] {
            assert_eq!(op.parse::<Comparator>().unwrap().as_str(), op);
        }
        assert!("=>".parse::<Comparator>().is_err());
    }
}
