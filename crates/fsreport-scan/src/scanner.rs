//! JWalk-based tree builder.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jwalk::{DirEntry, Parallelism, WalkDir};
use tracing::{debug, info, warn};

use fsreport_core::{
    BuildError, Diagnostic, FileTree, NodeId, NodeKind, TreeAssembler, TreeOptions,
};

use crate::filter::EntryFilter;

/// Builds a [`FileTree`] from the file system using jwalk for traversal.
///
/// Siblings are visited in name order so repeated builds of an unchanged
/// directory produce identical trees.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self
    }

    /// Build a tree according to `options`.
    ///
    /// Fails only when options are invalid or the starting path cannot be
    /// accessed. Entries that cannot be read are left out and reported as
    /// diagnostics on the returned tree.
    pub fn build(&self, options: &TreeOptions) -> Result<FileTree, BuildError> {
        let start = Instant::now();
        let start_path = options.start_path();
        let filter = Arc::new(EntryFilter::new(options)?);

        let root_path = start_path
            .canonicalize()
            .map_err(|e| BuildError::root_unavailable(&start_path, e))?;
        let root_metadata =
            std::fs::metadata(&root_path).map_err(|e| BuildError::root_unavailable(&root_path, e))?;

        debug!(root = %root_path.display(), max_depth = options.max_depth, "building tree");

        if !root_metadata.is_dir() {
            let assembler = TreeAssembler::new(
                &root_path,
                NodeKind::File,
                Some(root_metadata.len()),
                options.clone(),
            );
            return Ok(assembler.finish(start.elapsed()));
        }

        // The root must be listable, otherwise nothing below it can be built.
        std::fs::read_dir(&root_path).map_err(|e| BuildError::root_unavailable(&root_path, e))?;

        let mut assembler = TreeAssembler::new(&root_path, NodeKind::Directory, None, options.clone());
        let entries = collect_entries(options, &root_path, filter, &mut assembler);
        attach_entries(&root_path, options.max_depth, entries, &mut assembler);

        if options.prune_empty_dirs {
            assembler.prune_empty_dirs();
        }

        let tree = assembler.finish(start.elapsed());
        info!(
            root = %tree.root_path().display(),
            files = tree.stats().total_files,
            dirs = tree.stats().total_dirs,
            skipped = tree.diagnostics().len(),
            elapsed_ms = tree.build_duration().as_millis() as u64,
            "tree built"
        );
        Ok(tree)
    }
}

/// Entries yielded by the walker plus the paths that could not be read.
struct Collected {
    entries: Vec<DirEntry<((), ())>>,
    failed: HashSet<PathBuf>,
}

/// Walk the file system, pruning ignored and type-filtered entries before
/// jwalk descends into them.
fn collect_entries(
    options: &TreeOptions,
    root_path: &Path,
    filter: Arc<EntryFilter>,
    assembler: &mut TreeAssembler,
) -> Collected {
    let parallelism = match options.threads {
        0 => Parallelism::RayonDefaultPool {
            busy_timeout: Duration::from_millis(100),
        },
        n => Parallelism::RayonNewPool(n),
    };

    let walk_root = root_path.to_path_buf();
    let walker = WalkDir::new(root_path)
        .parallelism(parallelism)
        .skip_hidden(false)
        .follow_links(options.follow_symlinks)
        .sort(true)
        .min_depth(1)
        .max_depth(options.max_depth as usize)
        .process_read_dir(move |_depth, _dir, _state, children| {
            children.retain(|child| match child {
                // The root itself is never subject to filtering.
                Ok(entry) if entry.depth() == 0 => true,
                Ok(entry) => {
                    let path = entry.path();
                    let relative = path.strip_prefix(&walk_root).unwrap_or(path.as_path());
                    let name = entry.file_name().to_string_lossy();
                    filter.keep(relative, &name, entry.file_type().is_dir())
                }
                // Errors are kept so they surface as diagnostics.
                Err(_) => true,
            });
        });

    let mut entries = Vec::new();
    let mut failed = HashSet::new();

    for entry_result in walker {
        match entry_result {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root_path.to_path_buf());
                if path != root_path && failed.insert(path.clone()) {
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    assembler.push_diagnostic(Diagnostic::entry_skipped(&path, &err));
                }
            }
        }
    }

    Collected { entries, failed }
}

/// Attach collected entries to the assembler in walk order.
///
/// jwalk yields parents before their children, so every parent that was kept
/// is already known when its children arrive.
fn attach_entries(root_path: &Path, max_depth: u32, collected: Collected, assembler: &mut TreeAssembler) {
    let Collected { entries, failed } = collected;
    let mut ids: HashMap<PathBuf, NodeId> = HashMap::new();
    ids.insert(root_path.to_path_buf(), NodeId::ROOT);

    for entry in entries {
        if entry.depth() > max_depth as usize {
            continue;
        }
        let path = entry.path();
        if failed.contains(&path) {
            continue;
        }
        // Descendants of a skipped directory have no parent to attach to.
        let Some(parent) = path.parent().and_then(|p| ids.get(p)).copied() else {
            continue;
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type();

        let (kind, size) = if file_type.is_dir() {
            (NodeKind::Directory, None)
        } else {
            // Follows symlinks so a dangling link is reported rather than kept.
            match std::fs::metadata(&path) {
                Ok(metadata) => (NodeKind::File, Some(metadata.len())),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    assembler.push_diagnostic(Diagnostic::entry_skipped(&path, &err));
                    continue;
                }
            }
        };

        match assembler.add_child(parent, name, &path, kind, size) {
            Ok(id) => {
                if kind.is_dir() {
                    ids.insert(path, id);
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping entry");
                assembler.push_diagnostic(Diagnostic::entry_skipped(&path, &err));
            }
        }
    }
}
