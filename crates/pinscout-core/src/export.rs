use crate::{Error, Result};
use pinscout_deps::{Manifest, ManifestSummary, RequirementRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(ExportFormat::Table),
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Table => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ExportFormat::Table),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            other => Err(Error::ExportError(format!(
                "Unknown format '{}'. Use table, json, csv, or markdown",
                other
            ))),
        }
    }
}

/// Exporter for parsed requirements
pub struct Exporter;

impl Exporter {
    /// Export a manifest to a file with automatic format detection
    pub fn export_to_file<P: AsRef<Path>>(manifest: &Manifest, path: P) -> Result<()> {
        let path = path.as_ref();

        // Detect format from extension
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ExportError(
                    "Could not determine export format from extension. Use .json, .csv, .md, or .txt"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(manifest, path, format)
    }

    /// Export a manifest to a file with explicit format
    pub fn export_to_file_with_format<P: AsRef<Path>>(
        manifest: &Manifest,
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let path = path.as_ref();
        let content = Self::render(manifest, format)?;

        let mut file = File::create(path)
            .map_err(|e| Error::ExportError(format!("Failed to create file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(format!("Failed to write file: {}", e)))?;

        tracing::info!(path = %path.display(), ?format, "exported manifest");
        Ok(())
    }

    /// Render a manifest in the given format
    pub fn render(manifest: &Manifest, format: ExportFormat) -> Result<String> {
        let records = manifest.requirements();
        Ok(match format {
            ExportFormat::Table => Self::to_table(records),
            ExportFormat::Json => Self::to_json(records)?,
            ExportFormat::Csv => Self::to_csv(records),
            ExportFormat::Markdown => Self::to_markdown(records, &manifest.summary()),
        })
    }

    /// Export requirements to JSON format
    pub fn to_json(records: &[RequirementRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    /// Export requirements to CSV format
    pub fn to_csv(records: &[RequirementRecord]) -> String {
        let mut output = String::new();

        output.push_str("Line,Name,Version,Marker,Applies,Origin\n");

        for record in records {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                record.line(),
                Self::escape_csv(record.name()),
                Self::escape_csv(record.version()),
                Self::escape_csv(record.marker().unwrap_or("")),
                record.applicability(),
                Self::escape_csv(record.origin_comment().unwrap_or("")),
            ));
        }

        output
    }

    /// Export requirements to a Markdown table with a summary
    pub fn to_markdown(records: &[RequirementRecord], summary: &ManifestSummary) -> String {
        let mut output = String::new();

        output.push_str("# Pinned Requirements\n\n");
        output.push_str("| Package | Version | Marker | Origin |\n");
        output.push_str("|---------|---------|--------|--------|\n");

        for record in records {
            output.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                record.name(),
                record.version(),
                record
                    .marker()
                    .map(|m| format!("`{}`", m))
                    .unwrap_or_default(),
                Self::escape_markdown(record.origin_comment().unwrap_or("")),
            ));
        }

        output.push_str("\n## Summary\n\n");
        output.push_str(&format!("- Total: {}\n", summary.total_count));
        output.push_str(&format!("- Always installed: {}\n", summary.unconditional_count));
        output.push_str(&format!("- Marker-gated: {}\n", summary.conditional_count));
        if summary.excluded_count > 0 {
            output.push_str(&format!("- Excluded: {}\n", summary.excluded_count));
        }

        output
    }

    /// Plain aligned columns for the terminal
    pub fn to_table(records: &[RequirementRecord]) -> String {
        let name_width = records
            .iter()
            .map(|r| r.name().len())
            .chain(std::iter::once("PACKAGE".len()))
            .max()
            .unwrap_or_default();
        let version_width = records
            .iter()
            .map(|r| r.version().len())
            .chain(std::iter::once("VERSION".len()))
            .max()
            .unwrap_or_default();

        let mut output = format!(
            "{:<name_width$}  {:<version_width$}  MARKER\n",
            "PACKAGE", "VERSION"
        );
        for record in records {
            let line = format!(
                "{:<name_width$}  {:<version_width$}  {}",
                record.name(),
                record.version(),
                record.marker().unwrap_or("-"),
            );
            output.push_str(line.trim_end());
            output.push('\n');
        }

        output
    }

    /// Escape CSV special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    fn escape_markdown(s: &str) -> String {
        s.replace('|', "\\|")
    }
}
