//! End-to-end run: build the tree, resolve analysers, execute, merge.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use fsreport_analyze::AnalyserRegistry;
use fsreport_core::{Diagnostic, DiagnosticKind, TreeStats};
use fsreport_scan::TreeBuilder;

use crate::config::RunConfig;
use crate::engine::ExecutionEngine;
use crate::error::RunError;
use crate::merge::{MergeOutcome, ReportMerger};
use crate::outcome::AnalyserOutcome;

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Canonical root the tree was built from.
    pub root_path: PathBuf,
    /// Counts of the built tree.
    pub stats: TreeStats,
    /// Time spent building the tree.
    pub build_duration: Duration,
    /// One outcome per resolved analyser, in requested order.
    pub outcomes: Vec<AnalyserOutcome>,
    /// The written report.
    pub merge: MergeOutcome,
    /// Every non-fatal problem of the run: skipped entries, unresolved and
    /// failed analysers, empty report.
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Where the report was written.
    pub fn output(&self) -> &Path {
        &self.merge.path
    }

    /// Check if anything was skipped or failed.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// Runs the full build, analyse and merge sequence against a registry.
#[derive(Debug, Default)]
pub struct ReportPipeline {
    registry: AnalyserRegistry,
}

impl ReportPipeline {
    /// Create a pipeline with the built-in analysers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline resolving identifiers against `registry`.
    pub fn with_registry(registry: AnalyserRegistry) -> Self {
        Self { registry }
    }

    /// Get the registry.
    pub fn registry(&self) -> &AnalyserRegistry {
        &self.registry
    }

    /// Execute one run.
    ///
    /// Fails only when the tree cannot be built or the report cannot be
    /// written. Everything else ends up in [`RunReport::diagnostics`].
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, RunError> {
        let options = config.tree.clone();
        let tree = tokio::task::spawn_blocking(move || TreeBuilder::new().build(&options))
            .await
            .map_err(|e| RunError::Interrupted {
                message: e.to_string(),
            })??;
        let tree = Arc::new(tree);
        let root_path = tree.root_path().to_path_buf();

        let mut diagnostics = tree.diagnostics().to_vec();

        let resolution = self.registry.resolve(&config.analysers, &tree, &root_path);
        diagnostics.extend(resolution.diagnostics);
        info!(
            requested = config.analysers.len(),
            resolved = resolution.analysers.len(),
            "analysers resolved"
        );

        let engine = ExecutionEngine::with_config(config.engine.clone());
        let executed = engine.run(resolution.analysers).await;
        diagnostics.extend(executed.diagnostics);

        let merger = ReportMerger::new(config.format);
        let merge = match merger.merge(&executed.artifacts, &config.output) {
            Ok(merge) => merge,
            Err(source) => {
                warn!(path = %config.output.display(), error = %source, "report merge failed");
                diagnostics.push(source.to_diagnostic());
                return Err(RunError::ReportMergeFailed { source, diagnostics });
            }
        };
        diagnostics.extend(merge.diagnostics.iter().cloned());

        Ok(RunReport {
            root_path,
            stats: tree.stats().clone(),
            build_duration: tree.build_duration(),
            outcomes: executed.outcomes,
            merge,
            diagnostics,
        })
    }
}

/// Run with the built-in analysers.
pub async fn run_report(config: &RunConfig) -> Result<RunReport, RunError> {
    ReportPipeline::new().run(config).await
}
