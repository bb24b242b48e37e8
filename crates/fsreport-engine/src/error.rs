//! Fatal errors of the output step and of a whole run.

use std::path::PathBuf;

use thiserror::Error;

use fsreport_core::{BuildError, Diagnostic, DiagnosticKind};

/// The merged report could not be produced.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to write report to {path}: {message}")]
    ReportMergeFailed { path: PathBuf, message: String },
}

impl MergeError {
    pub(crate) fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ReportMergeFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Destination the merger was writing to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::ReportMergeFailed { path, .. } => path,
        }
    }

    /// Diagnostic describing this failure.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            DiagnosticKind::ReportMergeFailed,
            self.path().to_string_lossy(),
            self.to_string(),
        )
    }
}

/// A run that terminated with a non-zero outcome.
#[derive(Debug, Error)]
pub enum RunError {
    /// The tree could not be built; no analyser was started.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Analysis completed but the report could not be written.
    #[error("Report merge failed")]
    ReportMergeFailed {
        #[source]
        source: MergeError,
        /// Diagnostics gathered before the failure, ending with the failure itself.
        diagnostics: Vec<Diagnostic>,
    },

    /// The background tree build did not complete.
    #[error("Tree build task failed: {message}")]
    Interrupted { message: String },
}

impl RunError {
    /// Check if the starting path could not be accessed.
    pub fn is_root_unavailable(&self) -> bool {
        matches!(self, Self::Build(BuildError::RootUnavailable { .. }))
    }

    /// Diagnostics collected before the run stopped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::ReportMergeFailed { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}
