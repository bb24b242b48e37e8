//! Concurrent analyser execution and report merging for fsreport.
//!
//! This crate ties the workspace together:
//!
//! - [`ExecutionEngine`] runs resolved analysers concurrently against one
//!   shared tree, isolating failures and preserving requested order
//! - [`ReportMerger`] composes the collected artifacts into one document
//! - [`ReportPipeline`] runs build, resolve, execute and merge end to end
//!
//! # Example
//!
//! ```rust,no_run
//! use fsreport_engine::{RunConfig, run_report};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::new("/path/to/project", "report.json");
//!     let report = run_report(&config).await?;
//!
//!     println!("{} files, report at {}", report.stats.total_files, report.output().display());
//!     for diagnostic in &report.diagnostics {
//!         eprintln!("{diagnostic}");
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod error;
mod merge;
mod outcome;
mod pipeline;

pub use config::{
    EngineConfig, EngineConfigBuilder, EngineConfigBuilderError, ReportFormat, RunConfig,
    RunConfigBuilder, RunConfigBuilderError, default_analysers,
};
pub use engine::ExecutionEngine;
pub use error::{MergeError, RunError};
pub use merge::{EMPTY_REPORT_PLACEHOLDER, MergeOutcome, MergedReport, MergedSection, ReportMerger};
pub use outcome::{AnalyserOutcome, AnalyserState, EngineEvent, EngineOutcome};
pub use pipeline::{ReportPipeline, RunReport, run_report};

// Re-export the types a front end needs
pub use fsreport_analyze::{
    AnalysisError, AnalysisResult, Analyser, AnalyserRegistry, Artifact, ResolvedAnalyser,
    parse_analyser_list,
};
pub use fsreport_core::{Diagnostic, DiagnosticKind, TreeOptions, TreeOptionsBuilder, TreeStats};
