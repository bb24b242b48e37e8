//! Composition of artifacts into one written report.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fsreport_analyze::Artifact;
use fsreport_core::{Diagnostic, DiagnosticKind};

use crate::config::ReportFormat;
use crate::error::MergeError;

/// Line written in place of sections when no analyser produced one.
pub const EMPTY_REPORT_PLACEHOLDER: &str = "No analyser produced a report.";

/// The merged JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedReport {
    /// When the report was merged.
    pub generated_at: DateTime<Utc>,
    /// Sections in requested analyser order.
    pub sections: Vec<MergedSection>,
}

/// One artifact's content inside the merged document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedSection {
    /// Name of the analyser that produced the content.
    pub analyser: String,
    /// The artifact content, carried over untouched.
    pub content: serde_json::Value,
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Where the report was written.
    pub path: PathBuf,
    /// Encoding used.
    pub format: ReportFormat,
    /// Number of sections written.
    pub sections: usize,
    /// Size of the written report.
    pub bytes_written: u64,
    /// Warnings raised while merging.
    pub diagnostics: Vec<Diagnostic>,
}

impl MergeOutcome {
    /// Check if the report is a placeholder.
    pub fn is_empty(&self) -> bool {
        self.sections == 0
    }
}

/// Concatenates artifacts in the order given and writes the result.
///
/// The merger never looks inside an artifact beyond checking that it is
/// well-formed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportMerger {
    format: ReportFormat,
}

impl ReportMerger {
    /// Create a merger producing `format`.
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Get the output format.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Merge `artifacts` and write the result to `destination`.
    ///
    /// Missing parent directories are created. An empty artifact list still
    /// writes a placeholder report and yields an `EmptyReport` diagnostic.
    pub fn merge(&self, artifacts: &[Artifact], destination: &Path) -> Result<MergeOutcome, MergeError> {
        let sections = artifacts
            .iter()
            .map(|artifact| {
                serde_json::from_slice(artifact.content())
                    .map(|content| MergedSection {
                        analyser: artifact.analyser().to_string(),
                        content,
                    })
                    .map_err(|e| {
                        MergeError::new(
                            destination,
                            format!("Malformed artifact from '{}': {e}", artifact.analyser()),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let report = MergedReport {
            generated_at: Utc::now(),
            sections,
        };
        let bytes = self.render(&report, destination)?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                MergeError::new(destination, format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(destination, &bytes).map_err(|e| MergeError::new(destination, e.to_string()))?;

        let mut diagnostics = Vec::new();
        if report.sections.is_empty() {
            warn!(path = %destination.display(), "no artifacts to merge, wrote placeholder report");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::EmptyReport,
                destination.to_string_lossy(),
                format!(
                    "No analyser produced an artifact; wrote a placeholder report to {}",
                    destination.display()
                ),
            ));
        }

        info!(
            path = %destination.display(),
            sections = report.sections.len(),
            bytes = bytes.len(),
            "report written"
        );

        Ok(MergeOutcome {
            path: destination.to_path_buf(),
            format: self.format,
            sections: report.sections.len(),
            bytes_written: bytes.len() as u64,
            diagnostics,
        })
    }

    fn render(&self, report: &MergedReport, destination: &Path) -> Result<Vec<u8>, MergeError> {
        match self.format {
            ReportFormat::Json => {
                let mut bytes = serde_json::to_vec_pretty(report)
                    .map_err(|e| MergeError::new(destination, e.to_string()))?;
                bytes.push(b'\n');
                Ok(bytes)
            }
            ReportFormat::Text => {
                let mut out = format!("Report generated at {}\n\n", report.generated_at.to_rfc3339());
                if report.sections.is_empty() {
                    out.push_str(EMPTY_REPORT_PLACEHOLDER);
                    out.push('\n');
                }
                for section in &report.sections {
                    let body = serde_json::to_string_pretty(&section.content)
                        .map_err(|e| MergeError::new(destination, e.to_string()))?;
                    out.push_str(&format!("== {} ==\n{body}\n\n", section.analyser));
                }
                Ok(out.into_bytes())
            }
        }
    }
}
