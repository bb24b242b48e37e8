//! The contract every analysis pass implements.

use std::time::Duration;

use thiserror::Error;

use crate::artifact::Artifact;

/// Result type for analyser operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised by a single analyser. None of them abort sibling analysers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The pass over the tree failed.
    #[error("Analysis '{analyser}' failed: {message}")]
    AnalysisFailed { analyser: String, message: String },

    /// The result could not be rendered into an artifact.
    #[error("Artifact generation failed for '{analyser}': {message}")]
    ArtifactGenerationFailed { analyser: String, message: String },

    /// `produce_artifact` was called before `analyze` completed.
    #[error("Analyser '{analyser}' has not been run")]
    NotAnalyzed { analyser: String },

    /// The analyser did not finish within the configured limit.
    #[error("Analyser '{analyser}' timed out after {}ms", .timeout.as_millis())]
    Timeout { analyser: String, timeout: Duration },

    /// The analyser panicked.
    #[error("Analyser '{analyser}' panicked")]
    Panicked { analyser: String },

    /// The registry could not construct the analyser.
    #[error("Analyser '{analyser}' could not be constructed: {message}")]
    Construction { analyser: String, message: String },
}

impl AnalysisError {
    /// Create an analysis failure.
    pub fn failed(analyser: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AnalysisFailed {
            analyser: analyser.into(),
            message: message.into(),
        }
    }

    /// Create an artifact generation failure.
    pub fn artifact(analyser: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArtifactGenerationFailed {
            analyser: analyser.into(),
            message: message.into(),
        }
    }

    /// Create a not-analyzed error.
    pub fn not_analyzed(analyser: impl Into<String>) -> Self {
        Self::NotAnalyzed {
            analyser: analyser.into(),
        }
    }
}

/// A pluggable, read-only pass over a [`FileTree`](fsreport_core::FileTree).
///
/// Implementations are constructed bound to one shared tree and a root path
/// (see [`AnalyserRegistry`](crate::AnalyserRegistry)). The engine calls
/// [`analyze`](Analyser::analyze) on a worker thread, then
/// [`produce_artifact`](Analyser::produce_artifact) on the same worker.
/// Accumulated state belongs to the analyser alone; the tree is only read.
pub trait Analyser: Send {
    /// Stable human-readable label used in diagnostics and report headings.
    fn name(&self) -> &str;

    /// Run the pass over the tree. May take arbitrary time.
    fn analyze(&mut self) -> AnalysisResult<()>;

    /// Render the computed result. Fails with
    /// [`AnalysisError::NotAnalyzed`] if `analyze` has not completed.
    fn produce_artifact(&self) -> AnalysisResult<Artifact>;
}

impl std::fmt::Debug for dyn Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::failed("File Count", "boom");
        assert_eq!(err.to_string(), "Analysis 'File Count' failed: boom");

        let err = AnalysisError::Timeout {
            analyser: "slow".to_string(),
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Analyser 'slow' timed out after 250ms");
    }
}
