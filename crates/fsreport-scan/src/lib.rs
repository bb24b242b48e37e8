//! File system traversal for fsreport.
//!
//! This crate walks a directory with jwalk and produces the immutable
//! [`FileTree`] that analysis passes read.
//!
//! # Overview
//!
//! - **Ignore rules** prune entries (and whole subtrees) before descent
//! - **Type filters** keep only files with matching extensions; directories
//!   are always kept so the tree stays connected
//! - **Depth limit** directories at the maximum depth are created but never read
//! - **Non-fatal errors** unreadable entries are skipped and reported as
//!   diagnostics; only an inaccessible root fails the build
//!
//! # Example
//!
//! ```rust,no_run
//! use fsreport_scan::{TreeBuilder, TreeOptions};
//!
//! let options = TreeOptions::builder()
//!     .root("/path/to/scan")
//!     .ignore(vec!["target".to_string()])
//!     .type_filters(vec!["rs".to_string()])
//!     .max_depth(4u32)
//!     .build()
//!     .unwrap();
//! let tree = TreeBuilder::new().build(&options).unwrap();
//!
//! println!("Total files: {}", tree.stats().total_files);
//! for diagnostic in tree.diagnostics() {
//!     eprintln!("{diagnostic}");
//! }
//! ```

mod filter;
mod scanner;

pub use filter::EntryFilter;
pub use scanner::TreeBuilder;

// Re-export core types for convenience
pub use fsreport_core::{
    BuildError, Diagnostic, DiagnosticKind, FileNode, FileTree, NodeId, NodeKind, TreeOptions,
    TreeOptionsBuilder, TreeStats,
};
