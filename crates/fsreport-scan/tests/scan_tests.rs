use std::collections::HashSet;
use std::fs;
use std::path::Path;

use fsreport_scan::{DiagnosticKind, FileTree, NodeId, TreeBuilder, TreeOptions, TreeOptionsBuilder};
use tempfile::TempDir;

/// root/
///   a.txt
///   b.jpg
///   sub/
///     c.txt
fn scenario_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("b.jpg"), "jpeg").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/c.txt"), "charlie").unwrap();
    temp
}

/// A deeper tree with ignorable directories at several levels.
fn project_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for dir in [
        "src/core",
        "src/node_modules/pkg",
        "target/debug/deps",
        "docs/build/cache",
        "docs/img",
    ] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    for file in [
        "README.md",
        "src/main.rs",
        "src/core/lib.rs",
        "src/core/notes.TXT",
        "src/node_modules/pkg/index.js",
        "target/debug/deps/out.rlib",
        "docs/guide.md",
        "docs/build/cache/page.html",
        "docs/img/logo.png",
        "app.log",
    ] {
        fs::write(root.join(file), file).unwrap();
    }
    temp
}

fn build(root: &Path, configure: impl FnOnce(&mut TreeOptionsBuilder)) -> FileTree {
    let mut builder = TreeOptions::builder();
    builder.root(root);
    configure(&mut builder);
    TreeBuilder::new().build(&builder.build().unwrap()).unwrap()
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn relative_names(tree: &FileTree) -> HashSet<String> {
    tree.iter()
        .skip(1)
        .map(|n| {
            n.path
                .strip_prefix(tree.root_path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn assert_tree_shape(tree: &FileTree) {
    assert_eq!(tree.iter().filter(|n| n.parent().is_none()).count(), 1);
    assert_eq!(tree.root().depth, 0);
    assert_eq!(tree.edges().count(), tree.node_count() - 1);

    let mut seen = HashSet::new();
    for node in tree.iter() {
        assert!(seen.insert(node.id));
        if let Some(parent) = tree.parent(node.id) {
            assert_eq!(node.depth, parent.depth + 1);
            assert!(parent.is_dir());
        }
    }
    assert_eq!(seen.len(), tree.node_count());
}

#[test]
fn test_scenario_depth_one_cutoff() {
    let temp = scenario_tree();
    let tree = build(temp.path(), |b| {
        b.max_depth(1u32);
    });

    assert_eq!(tree.node_count(), 4);
    assert_eq!(
        relative_names(&tree),
        set(&["a.txt", "b.jpg", "sub"])
    );
    let sub = tree.iter().find(|n| n.name.as_str() == "sub").unwrap();
    assert!(sub.is_dir());
    assert_eq!(tree.children(sub.id).count(), 0);
    assert_tree_shape(&tree);
}

#[test]
fn test_scenario_type_filter_keeps_directories() {
    let temp = scenario_tree();

    let shallow = build(temp.path(), |b| {
        b.max_depth(1u32).type_filters(vec!["txt".to_string()]);
    });
    assert_eq!(
        relative_names(&shallow),
        set(&["a.txt", "sub"])
    );

    let deep = build(temp.path(), |b| {
        b.max_depth(2u32).type_filters(vec!["txt".to_string()]);
    });
    assert_eq!(
        relative_names(&deep),
        set(&["a.txt", "sub", "sub/c.txt"])
    );
    assert_tree_shape(&deep);
}

#[test]
fn test_depth_bound_holds_for_every_limit() {
    let temp = project_tree();
    for max_depth in 0..5u32 {
        let tree = build(temp.path(), |b| {
            b.max_depth(max_depth);
        });
        for node in tree.iter() {
            assert!(node.depth <= max_depth);
            if node.depth == max_depth {
                assert_eq!(tree.children(node.id).count(), 0);
            }
        }
        assert_tree_shape(&tree);
    }

    let root_only = build(temp.path(), |b| {
        b.max_depth(0u32);
    });
    assert_eq!(root_only.node_count(), 1);
}

#[test]
fn test_ignored_subtrees_are_absent() {
    let temp = project_tree();
    let tree = build(temp.path(), |b| {
        b.ignore(vec![
            "node_modules".to_string(),
            "*.log".to_string(),
            "docs/build".to_string(),
            "target/*".to_string(),
        ]);
    });

    let names = relative_names(&tree);
    for name in &names {
        assert!(!name.contains("node_modules"), "{name}");
        assert!(!name.starts_with("docs/build"), "{name}");
        assert!(!name.starts_with("target/"), "{name}");
        assert!(!name.ends_with(".log"), "{name}");
    }
    assert!(names.contains("target"));
    assert!(names.contains("docs/img/logo.png"));
    assert!(names.contains("src/core/lib.rs"));
    assert_tree_shape(&tree);
}

#[test]
fn test_type_filter_applies_to_files_only() {
    let temp = project_tree();
    let tree = build(temp.path(), |b| {
        b.type_filters(vec!["rs".to_string(), ".txt".to_string()]);
    });

    for node in tree.iter().filter(|n| n.is_file()) {
        let file_type = node.file_type().unwrap();
        assert!(file_type == "rs" || file_type == "txt", "{}", node.name);
    }
    let names = relative_names(&tree);
    assert!(names.contains("src/core/notes.TXT"));
    // Directories with no qualifying files are still present.
    assert!(names.contains("docs/img"));
    assert!(names.contains("target/debug/deps"));
}

#[test]
fn test_prune_empty_dirs() {
    let temp = project_tree();
    let tree = build(temp.path(), |b| {
        b.type_filters(vec!["rs".to_string()]).prune_empty_dirs(true);
    });

    assert_eq!(
        relative_names(&tree),
        set(&[
            "src",
            "src/main.rs",
            "src/core",
            "src/core/lib.rs",
        ])
    );
    assert_tree_shape(&tree);
}

#[test]
fn test_build_is_reproducible() {
    let temp = project_tree();
    let first = build(temp.path(), |_| {});
    let second = build(temp.path(), |_| {});

    let a: Vec<_> = first.iter().map(|n| (n.id, n.path.clone())).collect();
    let b: Vec<_> = second.iter().map(|n| (n.id, n.path.clone())).collect();
    assert_eq!(a, b);
    assert_eq!(first.root().id, NodeId::ROOT);
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_is_skipped() {
    let temp = scenario_tree();
    std::os::unix::fs::symlink(temp.path().join("missing"), temp.path().join("dangling")).unwrap();

    let tree = build(temp.path(), |_| {});
    assert!(!tree.iter().any(|n| n.name.as_str() == "dangling"));
    assert!(tree.diagnostics().iter().any(|d| {
        d.kind == DiagnosticKind::EntrySkipped && d.subject.ends_with("dangling")
    }));
    assert_eq!(tree.stats().total_files, 3);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp = scenario_tree();
    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden.txt"), "x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still list the directory; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let tree = build(temp.path(), |_| {});
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!tree.iter().any(|n| n.name.as_str() == "hidden.txt"));
    assert!(!tree.iter().any(|n| n.name.as_str() == "locked"));
    assert!(tree
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagnosticKind::EntrySkipped));
    assert!(tree.iter().any(|n| n.name.as_str() == "c.txt"));
}

#[test]
fn test_root_is_never_ignored() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("build");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("kept.txt"), "x").unwrap();

    let tree = build(&root, |b| {
        b.ignore(vec!["build".to_string()]);
    });
    assert_eq!(relative_names(&tree), set(&["kept.txt"]));
}
