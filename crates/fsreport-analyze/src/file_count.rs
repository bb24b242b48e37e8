//! Total file count analysis.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fsreport_core::{FileTree, NodeKind};

use crate::analyser::{AnalysisError, AnalysisResult, Analyser};
use crate::artifact::{Artifact, ReportSection};

/// Counts computed by [`FileCountAnalyser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCount {
    /// Number of file nodes.
    pub files: u64,
    /// Number of directory nodes, root included.
    pub directories: u64,
    /// Sum of known file sizes.
    pub total_bytes: u64,
}

/// Counts the `file`-kind nodes of a tree.
pub struct FileCountAnalyser {
    tree: Arc<FileTree>,
    root_path: PathBuf,
    result: Option<FileCount>,
}

impl FileCountAnalyser {
    /// Registry identifier.
    pub const ID: &'static str = "filecount";
    /// Human-readable name.
    pub const NAME: &'static str = "File Count";

    /// Create an analyser bound to `tree`.
    pub fn new(tree: Arc<FileTree>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            root_path: root_path.into(),
            result: None,
        }
    }

    /// The computed counts, once `analyze` has run.
    pub fn result(&self) -> Option<FileCount> {
        self.result
    }
}

impl Analyser for FileCountAnalyser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn analyze(&mut self) -> AnalysisResult<()> {
        let mut count = FileCount::default();
        for node in self.tree.iter() {
            match node.kind {
                NodeKind::File => {
                    count.files += 1;
                    count.total_bytes += node.size.unwrap_or(0);
                }
                NodeKind::Directory => count.directories += 1,
            }
        }
        self.result = Some(count);
        Ok(())
    }

    fn produce_artifact(&self) -> AnalysisResult<Artifact> {
        let count = self.result.ok_or_else(|| AnalysisError::not_analyzed(Self::NAME))?;
        ReportSection::new(Self::NAME, self.root_path.to_string_lossy())
            .row("Total files", count.files)
            .row("Directories", count.directories)
            .row("Total bytes", count.total_bytes)
            .summary(format!("{} files under {}", count.files, self.root_path.display()))
            .into_artifact(Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use fsreport_core::{NodeId, TreeAssembler, TreeOptions};

    fn tree() -> Arc<FileTree> {
        let mut asm = TreeAssembler::new("/r", NodeKind::Directory, None, TreeOptions::default());
        asm.add_child(NodeId::ROOT, "a.txt", "/r/a.txt", NodeKind::File, Some(10)).unwrap();
        let sub = asm.add_child(NodeId::ROOT, "sub", "/r/sub", NodeKind::Directory, None).unwrap();
        asm.add_child(sub, "b.rs", "/r/sub/b.rs", NodeKind::File, Some(5)).unwrap();
        Arc::new(asm.finish(Duration::ZERO))
    }

    #[test]
    fn test_counts_files_only() {
        let mut analyser = FileCountAnalyser::new(tree(), "/r");
        analyser.analyze().unwrap();
        assert_eq!(
            analyser.result(),
            Some(FileCount {
                files: 2,
                directories: 2,
                total_bytes: 15,
            })
        );
    }

    #[test]
    fn test_artifact_requires_analysis() {
        let analyser = FileCountAnalyser::new(tree(), "/r");
        assert!(matches!(
            analyser.produce_artifact(),
            Err(AnalysisError::NotAnalyzed { .. })
        ));
    }

    #[test]
    fn test_artifact_content() {
        let mut analyser = FileCountAnalyser::new(tree(), "/r");
        analyser.analyze().unwrap();
        let artifact = analyser.produce_artifact().unwrap();
        let section: ReportSection = serde_json::from_slice(artifact.content()).unwrap();
        assert_eq!(section.rows[0].label, "Total files");
        assert_eq!(section.rows[0].value, "2");
    }
}
