//! Immutable file tree container and its one-shot assembler.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::config::TreeOptions;
use crate::error::{BuildError, Diagnostic};
use crate::node::{Edge, FileNode, NodeId, NodeKind};

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of file nodes.
    pub total_files: u64,
    /// Total number of directory nodes, root included when it is a directory.
    pub total_dirs: u64,
    /// Sum of known file sizes in bytes.
    pub total_size: u64,
    /// Deepest depth present in the tree.
    pub max_depth: u32,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, kind: NodeKind, size: Option<u64>, depth: u32) {
        match kind {
            NodeKind::File => {
                self.total_files += 1;
                self.total_size += size.unwrap_or(0);
            }
            NodeKind::Directory => self.total_dirs += 1,
        }
        self.max_depth = self.max_depth.max(depth);
    }
}

/// A filtered, frozen snapshot of a file system region.
///
/// Nodes live in an arena indexed by [`NodeId`]. There is no mutating API, so
/// a tree wrapped in an `Arc` can be read from any number of threads.
///
/// Deserialising re-checks the tree shape, so a loaded tree upholds the same
/// invariants as one produced by [`TreeAssembler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct FileTree {
    nodes: Vec<FileNode>,
    root_path: PathBuf,
    options: TreeOptions,
    stats: TreeStats,
    built_at: SystemTime,
    build_duration: Duration,
    diagnostics: Vec<Diagnostic>,
}

impl FileTree {
    /// The root node.
    pub fn root(&self) -> &FileNode {
        &self.nodes[0]
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.nodes.get(id.index())
    }

    /// Direct children of a node, in stored order. Unknown ids yield nothing.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &FileNode> + '_ {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|child| &self.nodes[child.index()])
    }

    /// Parent of a node; `None` for the root or an unknown id.
    pub fn parent(&self, id: NodeId) -> Option<&FileNode> {
        self.get(id)
            .and_then(|node| node.parent)
            .map(|parent| &self.nodes[parent.index()])
    }

    /// Depth of a node below the root.
    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.get(id).map(|node| node.depth)
    }

    /// Absolute path of a node.
    pub fn path_of(&self, id: NodeId) -> Option<&Path> {
        self.get(id).map(|node| node.path.as_path())
    }

    /// Iterate every node exactly once, pre-order from the root.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Iterate all parent -> child edges in pre-order of the child.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.iter().filter_map(|node| {
            node.parent.map(|parent| Edge {
                parent,
                child: node.id,
            })
        })
    }

    /// Iterate only file nodes, pre-order.
    pub fn files(&self) -> impl Iterator<Item = &FileNode> + '_ {
        self.iter().filter(|node| node.is_file())
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges; always `node_count() - 1`.
    pub fn edge_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Starting path the tree was built from.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Options used to build the tree.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Summary statistics.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// When the build finished.
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// How long the build took.
    pub fn build_duration(&self) -> Duration {
        self.build_duration
    }

    /// Non-fatal problems encountered while building.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Check if there were any diagnostics during the build.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Serialised form of a [`FileTree`], checked before it is trusted.
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<FileNode>,
    root_path: PathBuf,
    options: TreeOptions,
    stats: TreeStats,
    built_at: SystemTime,
    build_duration: Duration,
    diagnostics: Vec<Diagnostic>,
}

impl TryFrom<RawTree> for FileTree {
    type Error = BuildError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        check_shape(&raw.nodes)?;
        Ok(Self {
            nodes: raw.nodes,
            root_path: raw.root_path,
            options: raw.options,
            stats: raw.stats,
            built_at: raw.built_at,
            build_duration: raw.build_duration,
            diagnostics: raw.diagnostics,
        })
    }
}

/// Verify that `nodes` form one tree rooted at index 0.
///
/// Every non-root node must point at a directory one level up that lists it,
/// and every listed child must point back. Depth strictly grows along parent
/// links, so there are no cycles; with `len - 1` child entries in total each
/// node is listed exactly once.
fn check_shape(nodes: &[FileNode]) -> Result<(), BuildError> {
    let root = nodes
        .first()
        .ok_or_else(|| BuildError::invalid_tree("tree has no root node"))?;
    if root.parent.is_some() || root.depth != 0 {
        return Err(BuildError::invalid_tree("root node must have no parent and depth 0"));
    }

    let mut listed = 0usize;
    for (index, node) in nodes.iter().enumerate() {
        if node.id.index() != index {
            return Err(BuildError::invalid_tree(format!(
                "node at index {index} carries id {}",
                node.id.0
            )));
        }

        if !node.children.is_empty() && !node.is_dir() {
            return Err(BuildError::invalid_tree(format!(
                "file {} has children",
                node.path.display()
            )));
        }
        for child in &node.children {
            let points_back = nodes
                .get(child.index())
                .is_some_and(|c| c.parent == Some(node.id));
            if !points_back {
                return Err(BuildError::invalid_tree(format!(
                    "node {} lists child {} that does not point back",
                    node.id.0, child.0
                )));
            }
        }
        listed += node.children.len();

        match node.parent {
            Some(parent) => {
                let parent_node = nodes.get(parent.index()).ok_or_else(|| {
                    BuildError::invalid_tree(format!("node {} has unknown parent {}", node.id.0, parent.0))
                })?;
                if parent_node.depth.checked_add(1) != Some(node.depth) {
                    return Err(BuildError::invalid_tree(format!(
                        "node {} has depth {} under a parent at depth {}",
                        node.id.0, node.depth, parent_node.depth
                    )));
                }
                if !parent_node.children.contains(&node.id) {
                    return Err(BuildError::invalid_tree(format!(
                        "node {} is missing from its parent's children",
                        node.id.0
                    )));
                }
            }
            None if index != 0 => {
                return Err(BuildError::invalid_tree(format!("node {} has no parent", node.id.0)));
            }
            None => {}
        }
    }

    if listed != nodes.len() - 1 {
        return Err(BuildError::invalid_tree(format!(
            "children lists name {listed} nodes, expected {}",
            nodes.len() - 1
        )));
    }
    Ok(())
}

/// Pre-order iterator over a [`FileTree`].
pub struct PreOrder<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.index()];
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

/// One-shot builder for a [`FileTree`].
///
/// Node ids are handed out densely in insertion order. Every node is attached
/// to an existing directory exactly once, which keeps the result a tree.
#[derive(Debug)]
pub struct TreeAssembler {
    nodes: Vec<FileNode>,
    root_path: PathBuf,
    options: TreeOptions,
    stats: TreeStats,
    diagnostics: Vec<Diagnostic>,
}

impl TreeAssembler {
    /// Start a tree whose root (depth 0) is `root_path`.
    pub fn new(root_path: impl Into<PathBuf>, kind: NodeKind, size: Option<u64>, options: TreeOptions) -> Self {
        let root_path = root_path.into();
        let name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root_path.to_string_lossy().to_string());

        let mut stats = TreeStats::new();
        stats.record(kind, size, 0);

        let root = FileNode::new(NodeId::ROOT, name, root_path.clone(), kind, size, 0, None);
        Self {
            nodes: vec![root],
            root_path,
            options,
            stats,
            diagnostics: Vec::new(),
        }
    }

    /// Attach a new node beneath `parent` at `parent.depth + 1`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        kind: NodeKind,
        size: Option<u64>,
    ) -> Result<NodeId, BuildError> {
        let id = NodeId::new(self.nodes.len() as u64);
        let parent_node = self
            .nodes
            .get_mut(parent.index())
            .ok_or_else(|| BuildError::invalid_tree(format!("unknown parent node {}", parent.0)))?;
        if !parent_node.is_dir() {
            return Err(BuildError::invalid_tree(format!(
                "cannot attach a child to file {}",
                parent_node.path.display()
            )));
        }

        let depth = parent_node.depth + 1;
        parent_node.children.push(id);
        self.stats.record(kind, size, depth);
        self.nodes
            .push(FileNode::new(id, name, path.into(), kind, size, depth, Some(parent)));
        Ok(id)
    }

    /// Record a non-fatal problem.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Remove directories (other than the root) whose subtree holds no files.
    ///
    /// Ids are reassigned so they stay dense and pre-ordered.
    pub fn prune_empty_dirs(&mut self) {
        let mut keep = vec![false; self.nodes.len()];
        keep[0] = true;
        // Children always have larger ids than their parents, so a reverse
        // sweep sees every subtree before its parent.
        for index in (1..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let has_kept_child = node.children.iter().any(|c| keep[c.index()]);
            keep[index] = node.is_file() || has_kept_child;
        }
        if keep.iter().all(|k| *k) {
            return;
        }

        let old = std::mem::take(&mut self.nodes);
        let mut remap = vec![None; old.len()];
        let mut order = Vec::with_capacity(old.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            remap[id.index()] = Some(NodeId::new(order.len() as u64));
            order.push(id);
            stack.extend(
                old[id.index()]
                    .children
                    .iter()
                    .rev()
                    .filter(|c| keep[c.index()])
                    .copied(),
            );
        }

        let mut stats = TreeStats::new();
        let mut nodes = Vec::with_capacity(order.len());
        for id in order {
            let mut node = old[id.index()].clone();
            node.id = remap[id.index()].unwrap_or(NodeId::ROOT);
            node.parent = node.parent.and_then(|p| remap[p.index()]);
            node.children = node.children.iter().filter_map(|c| remap[c.index()]).collect();
            stats.record(node.kind, node.size, node.depth);
            nodes.push(node);
        }
        self.nodes = nodes;
        self.stats = stats;
    }

    /// Freeze the tree.
    pub fn finish(self, build_duration: Duration) -> FileTree {
        FileTree {
            nodes: self.nodes,
            root_path: self.root_path,
            options: self.options,
            stats: self.stats,
            built_at: SystemTime::now(),
            build_duration,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileTree {
        let mut asm = TreeAssembler::new("/r", NodeKind::Directory, None, TreeOptions::default());
        let a = asm.add_child(NodeId::ROOT, "a.txt", "/r/a.txt", NodeKind::File, Some(3)).unwrap();
        let sub = asm.add_child(NodeId::ROOT, "sub", "/r/sub", NodeKind::Directory, None).unwrap();
        asm.add_child(sub, "c.txt", "/r/sub/c.txt", NodeKind::File, Some(4)).unwrap();
        assert_eq!(a, NodeId::new(1));
        asm.finish(Duration::ZERO)
    }

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dirs, 0);
    }

    #[test]
    fn test_navigation() {
        let tree = sample();
        assert_eq!(tree.root().depth, 0);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.edges().count(), 3);

        let names: Vec<_> = tree.children(NodeId::ROOT).map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "sub"]);

        let c = NodeId::new(3);
        assert_eq!(tree.depth(c), Some(2));
        assert_eq!(tree.parent(c).map(|n| n.name.as_str()), Some("sub"));
        assert!(tree.parent(NodeId::ROOT).is_none());
        assert_eq!(tree.stats().total_size, 7);
        assert_eq!(tree.stats().max_depth, 2);
    }

    #[test]
    fn test_pre_order() {
        let tree = sample();
        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["r", "a.txt", "sub", "c.txt"]);
    }

    #[test]
    fn test_rejects_child_of_file() {
        let mut asm = TreeAssembler::new("/r", NodeKind::Directory, None, TreeOptions::default());
        let f = asm.add_child(NodeId::ROOT, "f", "/r/f", NodeKind::File, Some(1)).unwrap();
        assert!(asm.add_child(f, "x", "/r/f/x", NodeKind::File, None).is_err());
        assert!(asm.add_child(NodeId::new(99), "x", "/x", NodeKind::File, None).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let tree = sample();
        let json = serde_json::to_string(&tree).unwrap();
        let loaded: FileTree = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.node_count(), 4);
        assert_eq!(loaded.edge_count(), 3);
        let names: Vec<_> = loaded.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["r", "a.txt", "sub", "c.txt"]);
    }

    fn load_with(edit: impl FnOnce(&mut serde_json::Value)) -> Result<FileTree, serde_json::Error> {
        let mut value = serde_json::to_value(sample()).unwrap();
        edit(&mut value);
        serde_json::from_value(value)
    }

    #[test]
    fn test_deserialize_rejects_empty_tree() {
        let err = load_with(|v| v["nodes"] = serde_json::json!([])).unwrap_err();
        assert!(err.to_string().contains("no root node"));
    }

    #[test]
    fn test_deserialize_rejects_cycle() {
        // sub (2) lists itself as a child.
        let result = load_with(|v| {
            v["nodes"][2]["children"] = serde_json::json!([3, 2]);
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_broken_links() {
        // c.txt claims the root as parent while sub still lists it.
        assert!(load_with(|v| v["nodes"][3]["parent"] = serde_json::json!(0)).is_err());
        // a.txt dropped from the root's children.
        assert!(load_with(|v| v["nodes"][0]["children"] = serde_json::json!([2])).is_err());
        // Depth out of step with the parent.
        assert!(load_with(|v| v["nodes"][1]["depth"] = serde_json::json!(5)).is_err());
        // Child attached under a file.
        assert!(load_with(|v| v["nodes"][1]["children"] = serde_json::json!([3])).is_err());
    }

    #[test]
    fn test_prune_empty_dirs() {
        let mut asm = TreeAssembler::new("/r", NodeKind::Directory, None, TreeOptions::default());
        let empty = asm.add_child(NodeId::ROOT, "empty", "/r/empty", NodeKind::Directory, None).unwrap();
        asm.add_child(empty, "inner", "/r/empty/inner", NodeKind::Directory, None).unwrap();
        let full = asm.add_child(NodeId::ROOT, "full", "/r/full", NodeKind::Directory, None).unwrap();
        asm.add_child(full, "x.txt", "/r/full/x.txt", NodeKind::File, Some(1)).unwrap();
        asm.prune_empty_dirs();

        let tree = asm.finish(Duration::ZERO);
        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["r", "full", "x.txt"]);
        assert_eq!(tree.parent(NodeId::new(2)).map(|n| n.id), Some(NodeId::new(1)));
        assert_eq!(tree.stats().total_dirs, 2);
    }
}
