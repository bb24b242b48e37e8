//! Report artifacts produced by analysers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyser::{AnalysisError, AnalysisResult};

/// Opaque report output of one analyser, tagged with the analyser's name.
///
/// Content is a JSON document; the merger composes artifacts without
/// interpreting what is inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    analyser: String,
    content: Vec<u8>,
}

impl Artifact {
    /// Create an artifact from already-rendered content.
    pub fn new(analyser: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            analyser: analyser.into(),
            content: content.into(),
        }
    }

    /// Name of the analyser that produced this artifact.
    pub fn analyser(&self) -> &str {
        &self.analyser
    }

    /// Raw content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the artifact carries no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A single labelled value in a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

/// Structured content the built-in analysers render into their artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section heading, usually the analyser name.
    pub title: String,
    /// When the section was rendered.
    pub generated_at: DateTime<Utc>,
    /// Root path the analysis ran against.
    pub root: String,
    /// Ordered rows.
    pub rows: Vec<ReportRow>,
    /// Optional one-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ReportSection {
    /// Start an empty section.
    pub fn new(title: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_at: Utc::now(),
            root: root.into(),
            rows: Vec::new(),
            summary: None,
        }
    }

    /// Append a row.
    pub fn row(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.rows.push(ReportRow {
            label: label.into(),
            value: value.to_string(),
        });
        self
    }

    /// Set the summary line.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Serialise the section into an artifact owned by `analyser`.
    pub fn into_artifact(self, analyser: &str) -> AnalysisResult<Artifact> {
        let content =
            serde_json::to_vec_pretty(&self).map_err(|e| AnalysisError::artifact(analyser, e.to_string()))?;
        Ok(Artifact::new(analyser, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_into_artifact() {
        let artifact = ReportSection::new("File Count", "/data")
            .row("Files", 3)
            .summary("3 files")
            .into_artifact("File Count")
            .unwrap();

        assert_eq!(artifact.analyser(), "File Count");
        let parsed: ReportSection = serde_json::from_slice(artifact.content()).unwrap();
        assert_eq!(parsed.title, "File Count");
        assert_eq!(parsed.rows[0].value, "3");
        assert_eq!(parsed.summary.as_deref(), Some("3 files"));
    }

    #[test]
    fn test_artifact_accessors() {
        let artifact = Artifact::new("x", b"{}".to_vec());
        assert_eq!(artifact.len(), 2);
        assert!(!artifact.is_empty());
    }
}
