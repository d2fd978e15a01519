use std::sync::Arc;

use super::*;
use crate::test_utils::detached_entry;
use crate::test_utils::RecordingSink;

fn entry(key: &str) -> Arc<Entry> {
    detached_entry(key, Arc::new(RecordingSink::default()))
}

fn entry_key(node: &KeyTree) -> Option<String> {
    node.entry().map(|e| e.key().to_string())
}

#[test]
fn insert_creates_namespace_and_leaf_nodes() {
    let mut tree = KeyTree::root();
    let rpm = entry("/Shooter/RPM");

    tree.insert(&rpm, "/Shooter/RPM");

    let shooter = tree.child("Shooter").unwrap();
    assert_eq!(shooter.key_path(), "/Shooter");
    assert!(shooter.entry().is_none());

    let leaf = shooter.child("RPM").unwrap();
    assert_eq!(leaf.key(), "RPM");
    assert_eq!(leaf.key_path(), "/Shooter/RPM");
    assert!(Arc::ptr_eq(&leaf.entry().unwrap(), &rpm));
}

#[test]
fn leading_slash_does_not_create_empty_child() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/a"), "/a");

    assert!(tree.child("").is_none());
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn doubled_and_trailing_slashes_are_skipped() {
    let mut tree = KeyTree::root();
    let b = entry("/a//b/");
    tree.insert(&b, "/a//b/");

    assert_eq!(tree.node_count(), 2);
    assert!(tree.find("/a/b").unwrap().entry().is_some());
}

#[test]
fn key_without_segments_is_ignored() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/"), "/");

    assert_eq!(tree.node_count(), 0);
    assert!(tree.entry().is_none());
}

#[test]
fn reinserting_same_key_replaces_entry_only() {
    let mut tree = KeyTree::root();
    let first = entry("/Arm/Angle");
    let second = entry("/Arm/Angle");

    tree.insert(&first, "/Arm/Angle");
    let count_after_first = tree.node_count();
    tree.insert(&second, "/Arm/Angle");

    assert_eq!(tree.node_count(), count_after_first);
    assert!(Arc::ptr_eq(&tree.find("/Arm/Angle").unwrap().entry().unwrap(), &second));
}

#[test]
fn prefix_keys_do_not_clobber_each_other() {
    let mut tree = KeyTree::root();
    let a = entry("/a");
    let ab = entry("/a/b");
    tree.insert(&a, "/a");
    tree.insert(&ab, "/a/b");

    let node = tree.find("/a").unwrap();
    assert_eq!(entry_key(node).as_deref(), Some("/a"));
    assert_eq!(entry_key(node.child("b").unwrap()).as_deref(), Some("/a/b"));
}

#[test]
fn terminal_insert_keeps_existing_children() {
    let mut tree = KeyTree::root();
    let ab = entry("/a/b");
    let a = entry("/a");
    tree.insert(&ab, "/a/b");
    tree.insert(&a, "/a");

    let node = tree.find("/a").unwrap();
    assert_eq!(entry_key(node).as_deref(), Some("/a"));
    assert_eq!(entry_key(node.child("b").unwrap()).as_deref(), Some("/a/b"));
}

#[test]
fn entry_reference_does_not_keep_entry_alive() {
    let mut tree = KeyTree::root();
    let transient = entry("/gone");
    tree.insert(&transient, "/gone");

    drop(transient);

    assert!(tree.find("/gone").unwrap().entry().is_none());
}

#[test]
fn matches_is_case_insensitive_and_includes_descendants() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/Shooter/RPM"), "/Shooter/RPM");
    tree.insert(&entry("/Drive/Heading"), "/Drive/Heading");

    let shooter = tree.child("Shooter").unwrap();
    assert!(shooter.matches("rpm"));
    assert!(shooter.matches("SHOOT"));
    assert!(!shooter.matches("heading"));
    assert!(tree.matches("heading"));
    assert!(shooter.matches(""));
}

#[test]
fn hidden_nodes_never_match() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/.schema/Shooter"), "/.schema/Shooter");
    tree.insert(&entry("/Shooter/RPM"), "/Shooter/RPM");

    let schema = tree.child(".schema").unwrap();
    assert!(!schema.matches("schema"));
    assert!(!schema.matches(""));
    assert!(schema.child("Shooter").is_some());
}

#[test]
fn matches_does_not_mutate_structure() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/a/b/c"), "/a/b/c");
    let before = tree.node_count();

    for _ in 0..3 {
        tree.matches("zzz");
        tree.matches("b");
    }

    assert_eq!(tree.node_count(), before);
}

#[test]
fn walk_is_depth_first_in_insertion_order() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/b/x"), "/b/x");
    tree.insert(&entry("/a"), "/a");
    tree.insert(&entry("/b/y"), "/b/y");

    let mut visited = Vec::new();
    tree.walk(|node, depth| visited.push((node.key_path().to_string(), depth)));

    assert_eq!(
        visited,
        vec![
            ("/b".to_string(), 0),
            ("/b/x".to_string(), 1),
            ("/b/y".to_string(), 1),
            ("/a".to_string(), 0),
        ]
    );
}

#[test]
fn visible_rows_prune_non_matching_and_hidden_subtrees() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/Shooter/RPM"), "/Shooter/RPM");
    tree.insert(&entry("/Shooter/Hood"), "/Shooter/Hood");
    tree.insert(&entry("/Drive/Heading"), "/Drive/Heading");
    tree.insert(&entry("/.meta/rpm"), "/.meta/rpm");

    let rows: Vec<(String, usize)> = tree
        .visible_rows("rpm")
        .into_iter()
        .map(|row| (row.node.key_path().to_string(), row.depth))
        .collect();

    assert_eq!(rows, vec![("/Shooter".to_string(), 0), ("/Shooter/RPM".to_string(), 1)]);
}

#[test]
fn find_returns_none_for_unknown_paths() {
    let mut tree = KeyTree::root();
    tree.insert(&entry("/a/b"), "/a/b");

    assert!(tree.find("/a/c").is_none());
    assert!(tree.find("/z").is_none());
}
