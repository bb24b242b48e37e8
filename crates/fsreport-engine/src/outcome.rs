//! Per-analyser state and the collected result of one engine run.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use fsreport_analyze::{AnalysisError, Artifact};
use fsreport_core::Diagnostic;

/// Lifecycle of one analyser inside the engine.
///
/// `Pending -> Running -> {Succeeded, Failed}`. `Succeeded` requires both the
/// pass and artifact generation to complete without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalyserState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl AnalyserState {
    /// Check if no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// State change reported while the engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Position in the requested order.
    pub position: usize,
    /// Analyser name.
    pub analyser: String,
    /// New state.
    pub state: AnalyserState,
}

/// Terminal record for one analyser.
#[derive(Debug)]
pub struct AnalyserOutcome {
    /// Position in the requested order.
    pub position: usize,
    /// Registry identifier the analyser was requested under.
    pub id: String,
    /// Analyser name.
    pub name: String,
    /// Final state, always terminal.
    pub state: AnalyserState,
    /// Time from start of the pass to the terminal state.
    pub elapsed: Duration,
    /// Why the analyser failed.
    pub error: Option<AnalysisError>,
}

impl AnalyserOutcome {
    /// Check if the analyser contributed an artifact.
    pub fn succeeded(&self) -> bool {
        self.state == AnalyserState::Succeeded
    }
}

/// Everything the engine returns once every analyser reached a terminal state.
#[derive(Debug, Default)]
pub struct EngineOutcome {
    /// Artifacts of succeeded analysers, in requested order.
    pub artifacts: Vec<Artifact>,
    /// One outcome per analyser, in requested order.
    pub outcomes: Vec<AnalyserOutcome>,
    /// One diagnostic per failed analyser.
    pub diagnostics: Vec<Diagnostic>,
}

impl EngineOutcome {
    /// Number of analysers that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Number of analysers that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Names of the analysers that produced the artifacts, in order.
    pub fn artifact_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(Artifact::analyser).collect()
    }

    /// Outcomes of failed analysers.
    pub fn failures(&self) -> impl Iterator<Item = &AnalyserOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}
