//! Per-extension file counts.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use fsreport_core::FileTree;

use crate::analyser::{AnalysisError, AnalysisResult, Analyser};
use crate::artifact::{Artifact, ReportSection};

/// Group label for files without an extension.
pub const NO_TYPE: &str = "(none)";

/// Groups the files of a tree by type and counts each group.
pub struct FileTypeCountAnalyser {
    tree: Arc<FileTree>,
    root_path: PathBuf,
    counts: Option<BTreeMap<String, u64>>,
}

impl FileTypeCountAnalyser {
    /// Registry identifier.
    pub const ID: &'static str = "filetypecount";
    /// Human-readable name.
    pub const NAME: &'static str = "File Type Count";

    /// Create an analyser bound to `tree`.
    pub fn new(tree: Arc<FileTree>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            root_path: root_path.into(),
            counts: None,
        }
    }

    /// Groups ordered by count descending, then type ascending.
    pub fn ranked(&self) -> Option<Vec<(&str, u64)>> {
        let counts = self.counts.as_ref()?;
        let mut ranked: Vec<_> = counts.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        Some(ranked)
    }
}

impl Analyser for FileTypeCountAnalyser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn analyze(&mut self) -> AnalysisResult<()> {
        let mut counts = BTreeMap::new();
        for node in self.tree.files() {
            let file_type = node.file_type().unwrap_or_else(|| NO_TYPE.to_string());
            *counts.entry(file_type).or_insert(0u64) += 1;
        }
        self.counts = Some(counts);
        Ok(())
    }

    fn produce_artifact(&self) -> AnalysisResult<Artifact> {
        let ranked = self.ranked().ok_or_else(|| AnalysisError::not_analyzed(Self::NAME))?;
        let total: u64 = ranked.iter().map(|(_, c)| c).sum();

        let section = ranked.iter().fold(
            ReportSection::new(Self::NAME, self.root_path.to_string_lossy()),
            |section, (file_type, count)| section.row(*file_type, count),
        );
        section
            .summary(format!("{total} files across {} types", ranked.len()))
            .into_artifact(Self::NAME)
    }
}
