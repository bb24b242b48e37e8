//! Tree building options.

use std::collections::BTreeSet;
use std::path::{MAIN_SEPARATOR_STR, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Depth limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: u32 = 1000;

/// Filtering configuration for one tree build. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TreeOptions {
    /// Starting path. `None` means the default file system root.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Names, globs or path fragments excluded together with their subtrees.
    #[builder(default)]
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Extension tokens. When non-empty, only matching files are kept.
    #[builder(default)]
    #[serde(default)]
    pub type_filters: Vec<String>,

    /// Levels below the root that are traversed.
    #[builder(default = "DEFAULT_MAX_DEPTH")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Descend into symlinked directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Drop directories left without any file after filtering.
    #[builder(default = "false")]
    #[serde(default)]
    pub prune_empty_dirs: bool,

    /// Number of walker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

impl TreeOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(root)) = &self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl TreeOptions {
    /// Create a new options builder.
    pub fn builder() -> TreeOptionsBuilder {
        TreeOptionsBuilder::default()
    }

    /// Options rooted at `root` with no filtering.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// The path the build starts from.
    pub fn start_path(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(MAIN_SEPARATOR_STR))
    }

    /// Normalised type filter tokens.
    pub fn type_filter_set(&self) -> BTreeSet<String> {
        self.type_filters
            .iter()
            .filter_map(|t| normalize_type_token(t))
            .collect()
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            root: None,
            ignore: Vec::new(),
            type_filters: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            follow_symlinks: false,
            prune_empty_dirs: false,
            threads: 0,
        }
    }
}

/// Trim, strip a leading `.` and lower-case a type token. Empty tokens yield `None`.
pub fn normalize_type_token(token: &str) -> Option<String> {
    let token = token.trim();
    let token = token.strip_prefix('.').unwrap_or(token);
    (!token.is_empty()).then(|| token.to_lowercase())
}
