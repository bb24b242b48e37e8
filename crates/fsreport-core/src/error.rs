//! Error and diagnostic types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Fatal errors while building a tree.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The starting path cannot be accessed at all.
    #[error("Root unavailable: {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options were rejected before traversal began.
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// An assembly step would break the tree shape.
    #[error("Invalid tree: {message}")]
    InvalidTree { message: String },
}

impl BuildError {
    /// Create a root-unavailable error with path context.
    pub fn root_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_tree(message: impl Into<String>) -> Self {
        Self::InvalidTree {
            message: message.into(),
        }
    }
}

/// Kind of non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file system entry could not be read and was left out of the tree.
    EntrySkipped,
    /// A requested analyser identifier is not registered.
    UnresolvedAnalyser,
    /// An analyser failed during its pass or while producing its artifact.
    AnalysisFailed,
    /// The merged report could not be written.
    ReportMergeFailed,
    /// No analyser produced an artifact; a placeholder report was written.
    EmptyReport,
}

/// A non-fatal problem surfaced to the caller instead of halting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind of problem.
    pub kind: DiagnosticKind,
    /// What the problem is about: a path, an analyser name or identifier.
    pub subject: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// A file system entry that was excluded because it could not be read.
    pub fn entry_skipped(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            kind: DiagnosticKind::EntrySkipped,
            message: format!("Skipped {}: {reason}", path.display()),
            subject: path.to_string_lossy().into_owned(),
        }
    }

    /// A requested analyser identifier that did not resolve.
    pub fn unresolved_analyser(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            kind: DiagnosticKind::UnresolvedAnalyser,
            message: format!("Unknown analyser '{id}', skipping"),
            subject: id,
        }
    }

    /// An analyser that failed.
    pub fn analysis_failed(analyser: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let analyser = analyser.into();
        Self {
            kind: DiagnosticKind::AnalysisFailed,
            message: format!("Analyser '{analyser}' failed: {reason}"),
            subject: analyser,
        }
    }

    /// Replace the message, keeping kind and subject.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
