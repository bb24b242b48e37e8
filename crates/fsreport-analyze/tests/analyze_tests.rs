use std::fs;
use std::sync::Arc;

use fsreport_analyze::{
    Analyser, AnalyserRegistry, DiagnosticKind, FileCountAnalyser, FileTypeCountAnalyser,
    ReportSection, parse_analyser_list,
};
use fsreport_scan::{TreeBuilder, TreeOptions};
use tempfile::TempDir;

fn scanned_tree() -> (TempDir, Arc<fsreport_analyze::FileTree>) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/bin")).unwrap();
    fs::create_dir_all(root.join("assets")).unwrap();
    fs::write(root.join("Cargo.toml"), "[package]").unwrap();
    fs::write(root.join("src/lib.rs"), "pub fn f() {}").unwrap();
    fs::write(root.join("src/bin/main.rs"), "fn main() {}").unwrap();
    fs::write(root.join("assets/logo.png"), [0u8; 16]).unwrap();
    fs::write(root.join("assets/icon.PNG"), [0u8; 8]).unwrap();
    fs::write(root.join("LICENSE"), "MIT").unwrap();

    let tree = TreeBuilder::new().build(&TreeOptions::new(root)).unwrap();
    (temp, Arc::new(tree))
}

fn section(analyser: &dyn Analyser) -> ReportSection {
    let artifact = analyser.produce_artifact().unwrap();
    assert_eq!(artifact.analyser(), analyser.name());
    serde_json::from_slice(artifact.content()).unwrap()
}

#[test]
fn test_file_count_on_scanned_tree() {
    let (_temp, tree) = scanned_tree();
    let mut analyser = FileCountAnalyser::new(Arc::clone(&tree), tree.root_path());
    analyser.analyze().unwrap();

    let counts = analyser.result().unwrap();
    assert_eq!(counts.files, 6);
    assert_eq!(counts.directories, 4);
    assert_eq!(counts.files, tree.stats().total_files);

    let section = section(&analyser);
    assert_eq!(section.title, "File Count");
    assert_eq!(section.root, tree.root_path().to_string_lossy());
}

#[test]
fn test_file_type_count_on_scanned_tree() {
    let (_temp, tree) = scanned_tree();
    let mut analyser = FileTypeCountAnalyser::new(Arc::clone(&tree), tree.root_path());
    analyser.analyze().unwrap();

    let rows: Vec<_> = section(&analyser)
        .rows
        .into_iter()
        .map(|r| (r.label, r.value))
        .collect();
    let expected: Vec<(String, String)> = [("png", "2"), ("rs", "2"), ("(none)", "1"), ("toml", "1")]
        .into_iter()
        .map(|(label, value)| (label.to_string(), value.to_string()))
        .collect();
    assert_eq!(rows, expected);
}

#[test]
fn test_registry_resolves_requested_order() {
    let (_temp, tree) = scanned_tree();
    let registry = AnalyserRegistry::with_builtins();
    let requested = parse_analyser_list("fileCount,unknownAnalyser,fileTypeCount");

    let resolution = registry.resolve(&requested, &tree, tree.root_path());
    assert_eq!(resolution.names(), ["File Count", "File Type Count"]);
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::UnresolvedAnalyser);
    assert_eq!(resolution.diagnostics[0].subject, "unknownAnalyser");

    for mut resolved in resolution.analysers {
        resolved.analyser.analyze().unwrap();
        assert!(!resolved.analyser.produce_artifact().unwrap().is_empty());
    }
}

#[test]
fn test_analysers_share_one_tree() {
    let (_temp, tree) = scanned_tree();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tree = Arc::clone(&tree);
            std::thread::spawn(move || {
                let mut analyser = FileCountAnalyser::new(Arc::clone(&tree), tree.root_path());
                analyser.analyze().unwrap();
                analyser.result().unwrap().files
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 6);
    }
}
