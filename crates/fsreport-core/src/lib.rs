//! Core types for fsreport.
//!
//! This crate provides the immutable tree model that every analysis pass
//! reads, the options that control how a tree is built, and the error and
//! diagnostic types shared across the workspace.

mod config;
mod error;
mod node;
mod tree;

pub use config::{
    DEFAULT_MAX_DEPTH, TreeOptions, TreeOptionsBuilder, TreeOptionsBuilderError, normalize_type_token,
};
pub use error::{BuildError, Diagnostic, DiagnosticKind};
pub use node::{Edge, FileNode, NodeId, NodeKind};
pub use tree::{FileTree, PreOrder, TreeAssembler, TreeStats};
