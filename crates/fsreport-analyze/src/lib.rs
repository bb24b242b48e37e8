//! Analysis passes for fsreport.
//!
//! This crate defines the [`Analyser`] contract, the [`Artifact`] each pass
//! produces, and the [`AnalyserRegistry`] that turns a list of textual
//! identifiers into analysers bound to one shared tree.
//!
//! Built-in analysers:
//!
//! - **`filecount`** - counts the files in the tree
//! - **`filetypecount`** - groups files by extension and counts each group
//!
//! # Writing an analyser
//!
//! ```rust
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! use fsreport_analyze::{
//!     AnalysisError, AnalysisResult, Analyser, AnalyserRegistry, Artifact, ReportSection,
//! };
//! use fsreport_core::FileTree;
//!
//! struct DeepestFile {
//!     tree: Arc<FileTree>,
//!     root: PathBuf,
//!     depth: Option<u32>,
//! }
//!
//! impl Analyser for DeepestFile {
//!     fn name(&self) -> &str {
//!         "Deepest File"
//!     }
//!
//!     fn analyze(&mut self) -> AnalysisResult<()> {
//!         self.depth = Some(self.tree.files().map(|n| n.depth).max().unwrap_or(0));
//!         Ok(())
//!     }
//!
//!     fn produce_artifact(&self) -> AnalysisResult<Artifact> {
//!         let depth = self.depth.ok_or_else(|| AnalysisError::not_analyzed(self.name()))?;
//!         ReportSection::new(self.name(), self.root.to_string_lossy())
//!             .row("Depth", depth)
//!             .into_artifact(self.name())
//!     }
//! }
//!
//! let mut registry = AnalyserRegistry::with_builtins();
//! registry.register("deepest", |tree: Arc<FileTree>, root: &Path| {
//!     Ok(Box::new(DeepestFile { tree, root: root.to_path_buf(), depth: None }) as Box<dyn Analyser>)
//! });
//! assert!(registry.contains("deepest"));
//! ```

mod analyser;
mod artifact;
pub mod file_count;
pub mod file_type_count;
mod registry;

pub use analyser::{AnalysisError, AnalysisResult, Analyser};
pub use artifact::{Artifact, ReportRow, ReportSection};
pub use file_count::{FileCount, FileCountAnalyser};
pub use file_type_count::FileTypeCountAnalyser;
pub use registry::{AnalyserFactory, AnalyserRegistry, Resolution, ResolvedAnalyser, parse_analyser_list};

// Re-export core types
pub use fsreport_core::{Diagnostic, DiagnosticKind, FileTree};
