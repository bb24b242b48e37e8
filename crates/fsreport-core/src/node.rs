//! File and directory node types.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Identifier of a node within one tree. Ids are dense and the root is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The id every tree assigns to its root.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of file system entry kept in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file (symlinks that are not followed are recorded as files).
    File,
    /// Directory.
    Directory,
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }
}

/// A parent-contains-child relationship. Always directed parent -> child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
}

/// A single file or directory in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Identifier of this node.
    pub id: NodeId,

    /// File/directory name (not full path).
    pub name: CompactString,

    /// Absolute path of the entry.
    pub path: PathBuf,

    /// Entry kind.
    pub kind: NodeKind,

    /// Size in bytes. Only known for files.
    pub size: Option<u64>,

    /// Distance from the root; the root has depth 0.
    pub depth: u32,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl FileNode {
    pub(crate) fn new(
        id: NodeId,
        name: impl Into<CompactString>,
        path: PathBuf,
        kind: NodeKind,
        size: Option<u64>,
        depth: u32,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            path,
            kind,
            size,
            depth,
            parent,
            children: Vec::new(),
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in stored (name-sorted) order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Lower-cased extension without the leading dot.
    ///
    /// Returns `None` for directories and for files without an extension.
    /// Dotfiles such as `.gitignore` have no extension.
    pub fn file_type(&self) -> Option<String> {
        if !self.is_file() {
            return None;
        }
        extension_of(Path::new(self.name.as_str()))
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileNode {
        FileNode::new(
            NodeId::new(1),
            name,
            PathBuf::from("/tmp").join(name),
            NodeKind::File,
            Some(10),
            1,
            Some(NodeId::ROOT),
        )
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.0, 42);
        assert_eq!(NodeId::ROOT.index(), 0);
    }

    #[test]
    fn test_file_type() {
        assert_eq!(file("a.TXT").file_type().as_deref(), Some("txt"));
        assert_eq!(file("archive.tar.gz").file_type().as_deref(), Some("gz"));
        assert_eq!(file("Makefile").file_type(), None);
        assert_eq!(file(".gitignore").file_type(), None);
    }

    #[test]
    fn test_directory_has_no_file_type() {
        let dir = FileNode::new(
            NodeId::new(2),
            "src.d",
            PathBuf::from("/tmp/src.d"),
            NodeKind::Directory,
            None,
            1,
            Some(NodeId::ROOT),
        );
        assert!(dir.is_dir());
        assert_eq!(dir.file_type(), None);
    }
}
