//! Tests for TreeService

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use nestdnd::application::{ApplicationError, TreeService};
use nestdnd::config::Settings;
use nestdnd::domain::{initial_items, DomainError, MoveOutcome, NodeId, SeedFile};
use nestdnd::infrastructure::traits::{FileSystem, RealFileSystem};

/// In-memory filesystem holding seed files
#[derive(Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

fn service_with(fs: impl FileSystem + 'static, settings: Settings) -> TreeService {
    TreeService::new(Arc::new(fs), Arc::new(settings))
}

fn seeded(path: &str) -> Settings {
    Settings {
        seed_file: Some(PathBuf::from(path)),
        ..Settings::default()
    }
}

const SEED: &str = r#"
[[items]]
id = "inbox"
label = "Inbox"

  [[items.children]]
  label = "Unsorted"

[[items]]
id = "done"
label = "Done"
"#;

#[test]
fn given_no_seed_file_when_loading_then_uses_builtin_list() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());

    let nodes = service.load_nodes().unwrap();

    assert_eq!(nodes, initial_items());
}

#[test]
fn given_seed_file_when_loading_then_builds_tree_with_generated_ids() {
    let fs = MemoryFileSystem::default().with_file("/seed.toml", SEED);
    let service = service_with(fs, seeded("/seed.toml"));

    let tree = service.load_tree().unwrap();

    assert_eq!(tree.len(), 3);
    let children = tree.children_of("inbox").unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(tree.get(children[0].as_str()).unwrap().label, "Unsorted");
}

#[test]
fn given_missing_ids_disallowed_when_loading_then_empty_id_error() {
    let fs = MemoryFileSystem::default().with_file("/seed.toml", SEED);
    let settings = Settings {
        generate_missing_ids: false,
        ..seeded("/seed.toml")
    };
    let service = service_with(fs, settings);

    let err = service.load_tree().unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::EmptyId { .. })
    ));
}

#[test]
fn given_duplicate_ids_in_seed_when_loading_then_rejected() {
    let seed = "[[items]]\nid = \"a\"\nlabel = \"A\"\n[[items]]\nid = \"a\"\nlabel = \"B\"\n";
    let fs = MemoryFileSystem::default().with_file("/dup.toml", seed);
    let service = service_with(fs, seeded("/dup.toml"));

    let err = service.load_tree().unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateId(_))
    ));
}

#[test]
fn given_absent_seed_file_when_loading_then_operation_failed() {
    let service = service_with(MemoryFileSystem::default(), seeded("/nowhere.toml"));

    let err = service.load_nodes().unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("/nowhere.toml"));
}

#[test]
fn given_tree_when_adding_items_then_appends_with_fresh_ids() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());
    let mut tree = service.load_tree().unwrap();

    let root = service.add_item(&mut tree, "  Item 4 ", None).unwrap();
    let child = service.add_item(&mut tree, "Item 1.3", Some("1")).unwrap();

    assert_ne!(root, child);
    assert_eq!(tree.get(root.as_str()).unwrap().label, "Item 4");
    assert_eq!(tree.root_ids().last().unwrap().as_str(), root.as_str());
    assert_eq!(tree.parent_of(child.as_str()).unwrap().as_str(), "1");
}

#[test]
fn given_unknown_parent_when_adding_then_parent_not_found() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());
    let mut tree = service.load_tree().unwrap();

    let err = service.add_item(&mut tree, "orphan", Some("77")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::ParentNotFound(_))
    ));
    assert_eq!(tree.len(), 6);
}

#[test]
fn given_moved_tree_when_exporting_then_seed_reloads_identically() {
    let temp = TempDir::new().unwrap();
    let service = service_with(RealFileSystem, Settings::default());
    let mut tree = service.load_tree().unwrap();
    assert!(tree.move_node("1-1", "3").is_moved());

    let exported = service.export_toml(&tree).unwrap();
    let path = temp.path().join("export.toml");
    std::fs::write(&path, &exported).unwrap();

    let reloaded = service_with(RealFileSystem, seeded(path.to_str().unwrap()))
        .load_nodes()
        .unwrap();
    assert_eq!(reloaded, tree.to_nodes());
    assert_eq!(
        SeedFile::parse(&exported).unwrap().items[2].children[0].id.as_deref(),
        Some("1-1")
    );
}

#[test]
fn given_rejected_move_when_exporting_then_outcome_kept_and_toml_unchanged() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());
    let mut tree = service.load_tree().unwrap();
    let original = service.export_toml(&tree).unwrap();

    let (outcome, body) = service.move_and_render(&mut tree, "1-1", "1", true).unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::AncestorTarget {
            node: NodeId::new("1-1"),
            target: NodeId::new("1"),
        }
    );
    assert_eq!(body, original);
}

#[test]
fn given_valid_move_when_rendering_then_body_shows_new_position() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());
    let mut tree = service.load_tree().unwrap();

    let (outcome, body) = service.move_and_render(&mut tree, "3", "1", false).unwrap();

    assert!(outcome.is_moved());
    assert_eq!(body, service.render(&tree, None));
    assert!(body.contains("Item 3 [3]"));
}

#[test]
fn given_builtin_tree_when_summarising_then_reports_count_depth_and_leaves() {
    let service = service_with(MemoryFileSystem::default(), Settings::default());
    let tree = service.load_tree().unwrap();

    assert_eq!(service.summary(&tree), "6 items, depth 3, leaves: 1-1, 1-2-1, 2, 3");
}

#[test]
fn given_ids_hidden_when_rendering_then_only_labels_shown() {
    let settings = Settings {
        show_ids: false,
        ..Settings::default()
    };
    let service = service_with(MemoryFileSystem::default(), settings);
    let tree = service.load_tree().unwrap();

    let rendered = service.render(&tree, None);

    assert!(rendered.contains("Item 1.2.1"));
    assert!(!rendered.contains('['));
}
