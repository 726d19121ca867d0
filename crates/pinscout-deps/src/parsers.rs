use crate::error::{ManifestError, Result};
use crate::marker::MarkerExpr;
use crate::models::{normalize_name, ExcludedPin, Manifest, ManifestLine, RequirementRecord};
use crate::render::EXCLUDED_HEADER;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

/// PEP 508 project name: alphanumeric at both ends, `.`, `_`, `-` inside
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap());

/// Exact pin, no ranges or wildcards
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+!-]*$").unwrap());

/// Parse a pinned requirements file into an ordered manifest
///
/// Fails on the first line that is neither blank, a comment nor a
/// `name==version[; marker][  # comment]` requirement, and on the first
/// package pinned twice. Comment and blank lines are kept in the layout so
/// the file can be rendered back without losing provenance notes.
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut requirements = Vec::new();
    let mut excluded = Vec::new();
    let mut layout = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    // Commented-out pins only count below pip-compile's "unsafe" header
    let mut in_excluded_block = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            layout.push(ManifestLine::Blank);
            continue;
        }
        if let Some(body) = line.strip_prefix('#') {
            if line == EXCLUDED_HEADER {
                in_excluded_block = true;
            } else if in_excluded_block {
                if let Some(pin) = parse_excluded_pin(body, line_no) {
                    debug!(line = line_no, name = pin.name(), "excluded pin");
                    layout.push(ManifestLine::Excluded(excluded.len()));
                    excluded.push(pin);
                    continue;
                }
            }
            layout.push(ManifestLine::Comment(raw.trim_end().to_string()));
            continue;
        }

        in_excluded_block = false;
        let record =
            parse_requirement_line(line, line_no).map_err(|reason| ManifestError::MalformedLine {
                line: line_no,
                text: raw.to_string(),
                reason,
            })?;

        let key = normalize_name(record.name());
        if let Some(&first_line) = seen.get(&key) {
            return Err(ManifestError::DuplicateRequirement {
                name: record.name().to_string(),
                first_line,
                line: line_no,
            });
        }
        seen.insert(key, line_no);

        debug!(
            line = line_no,
            name = record.name(),
            version = record.version(),
            marker = record.marker(),
            "parsed requirement"
        );
        layout.push(ManifestLine::Requirement(requirements.len()));
        requirements.push(record);
    }

    info!(
        requirements = requirements.len(),
        excluded = excluded.len(),
        "parsed manifest"
    );

    Ok(Manifest::new(requirements, excluded, layout))
}

/// Same as [`parse_manifest`], keeping only the requirement records
pub fn parse_requirements(content: &str) -> Result<Vec<RequirementRecord>> {
    parse_manifest(content).map(Manifest::into_requirements)
}

fn parse_requirement_line(
    line: &str,
    line_no: usize,
) -> std::result::Result<RequirementRecord, String> {
    let (body, origin_comment) = split_inline_comment(line)?;

    let (pin, marker) = match body.split_once(';') {
        Some((pin, marker)) => (pin.trim(), Some(marker.trim())),
        None => (body.trim(), None),
    };

    let (name, version) = pin
        .split_once("==")
        .ok_or_else(|| format!("expected `name==version`, found `{}`", pin))?;
    let (name, version) = (name.trim(), version.trim());

    if !NAME_RE.is_match(name) {
        return Err(format!("invalid package name `{}`", name));
    }
    if !VERSION_RE.is_match(version) {
        return Err(format!("`{}` is not an exact version pin", version));
    }

    if let Some(marker) = marker {
        MarkerExpr::parse(marker).map_err(|e| e.to_string())?;
    }

    Ok(RequirementRecord::new(
        name.to_string(),
        version.to_string(),
        marker.map(str::to_string),
        origin_comment.map(str::to_string),
        line_no,
    ))
}

/// Split `body  # comment` into the body and the trimmed comment text
///
/// The `#` must follow whitespace; an empty comment counts as no comment.
fn split_inline_comment(line: &str) -> std::result::Result<(&str, Option<&str>), String> {
    let Some(idx) = line.find('#') else {
        return Ok((line, None));
    };

    let before = &line[..idx];
    if !before.ends_with(char::is_whitespace) {
        return Err("inline comment must be separated by whitespace".to_string());
    }

    let comment = line[idx + 1..].trim();
    Ok((before.trim_end(), (!comment.is_empty()).then_some(comment)))
}

/// Recognize a commented-out pin: `# name[==version][  # comment]`
fn parse_excluded_pin(body: &str, line_no: usize) -> Option<ExcludedPin> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let (pin, origin_comment) = split_inline_comment(body).ok()?;
    let (name, version) = match pin.split_once("==") {
        Some((name, version)) => (name.trim(), Some(version.trim())),
        None => (pin, None),
    };

    if !NAME_RE.is_match(name) || !version.map_or(true, |v| VERSION_RE.is_match(v)) {
        return None;
    }

    Some(ExcludedPin::new(
        name.to_string(),
        version.map(str::to_string),
        origin_comment.map(str::to_string),
        line_no,
    ))
}
