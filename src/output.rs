//! CLI output formatting.
//!
//! Each `format_*` function is pure (no I/O, no side effects) and returns
//! the lines to print, so formatting is unit-testable. `print_*` wrappers
//! write to stdout. The same report structs serialize to JSON for `--json`.

use serde::Serialize;
use std::path::PathBuf;

/// Facts about the freshly embedded thumbnail, read back from the output
/// file as a round-trip check.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Outcome of processing one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn success(source: PathBuf, output: PathBuf, thumbnail: ThumbnailInfo) -> Self {
        Self {
            source,
            output: Some(output),
            thumbnail: Some(thumbnail),
            error: None,
        }
    }

    pub fn failure(source: PathBuf, error: String) -> Self {
        Self {
            source,
            output: None,
            thumbnail: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Format a byte count as a human-readable KiB figure.
fn format_size(bytes: usize) -> String {
    format!("{:.1} KiB", bytes as f64 / 1024.0)
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format per-file results plus a summary line.
///
/// ```text
/// 001 IMG_0001.jpg
///     Thumbnail: 320x240, 11.4 KiB
///     Output: IMG_0001-rethumb.jpg
/// 002 broken.jpg
///     Error: could not decode source image: ...
///
/// Rebuilt 1 thumbnail, 1 failed
/// ```
pub fn format_reports(reports: &[FileReport]) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, report) in reports.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            report.source.display()
        ));
        match (&report.thumbnail, &report.output, &report.error) {
            (Some(thumbnail), Some(output), None) => {
                lines.push(format!(
                    "    Thumbnail: {}x{}, {}",
                    thumbnail.width,
                    thumbnail.height,
                    format_size(thumbnail.bytes)
                ));
                lines.push(format!("    Output: {}", output.display()));
            }
            _ => {
                let error = report.error.as_deref().unwrap_or("unknown error");
                lines.push(format!("    Error: {error}"));
            }
        }
    }

    let rebuilt = reports.iter().filter(|r| r.is_success()).count();
    let failed = reports.len() - rebuilt;
    let plural = if rebuilt == 1 { "" } else { "s" };
    lines.push(String::new());
    lines.push(if failed > 0 {
        format!("Rebuilt {rebuilt} thumbnail{plural}, {failed} failed")
    } else {
        format!("Rebuilt {rebuilt} thumbnail{plural}")
    });

    lines
}

pub fn print_reports(reports: &[FileReport]) {
    for line in format_reports(reports) {
        println!("{line}");
    }
}

/// Render the reports as a pretty-printed JSON array.
pub fn reports_to_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
