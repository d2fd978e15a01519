//! Trie over `/`-delimited key segments
//!
//! Every segment ever observed gets a node, including pure namespace
//! segments that never carry a value themselves. A node's `entry` is a
//! non-owning back-reference; the [`Registry`](crate::Registry) owns entries.
//!
//! ```text
//! /                      (root, key_path "")
//! ├── Shooter            (key_path "/Shooter")
//! │   ├── RPM  -> Entry  (key_path "/Shooter/RPM")
//! │   └── PID
//! │       └── kP -> Entry
//! └── .schema            (hidden from filtering)
//! ```

#[cfg(test)]
mod tree_test;

use std::sync::Arc;
use std::sync::Weak;

use indexmap::IndexMap;
use tracing::debug;

use crate::constants::HIDDEN_SEGMENT_PREFIX;
use crate::constants::KEY_SEPARATOR;
use crate::Entry;

#[derive(Debug)]
pub struct KeyTree {
    key: String,
    key_path: String,
    entry: Option<Weak<Entry>>,
    children: IndexMap<String, KeyTree>,
}

/// One visible line of a filtered tree listing
#[derive(Debug, Clone)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub node: &'a KeyTree,
}

impl KeyTree {
    pub fn root() -> Self {
        Self::node(KEY_SEPARATOR.to_string(), String::new())
    }

    fn node(
        key: String,
        key_path: String,
    ) -> Self {
        Self {
            key,
            key_path,
            entry: None,
            children: IndexMap::new(),
        }
    }

    /// Single path segment of this node
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Full path from the root, e.g. `/Shooter/RPM`
    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn entry(&self) -> Option<Arc<Entry>> {
        self.entry.as_ref().and_then(Weak::upgrade)
    }

    pub fn children(&self) -> impl Iterator<Item = &KeyTree> {
        self.children.values()
    }

    pub fn child(
        &self,
        segment: &str,
    ) -> Option<&KeyTree> {
        self.children.get(segment)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Associates `entry` with the node at `full_key`, creating every missing
    /// node on the way.
    ///
    /// Empty segments (leading, doubled or trailing `/`) are skipped. An
    /// existing node keeps its children; only its entry reference is
    /// replaced.
    pub fn insert(
        &mut self,
        entry: &Arc<Entry>,
        full_key: &str,
    ) {
        let segments: Vec<&str> = split_key(full_key).collect();
        if segments.is_empty() {
            debug!(key = full_key, "key has no segments, not inserted");
            return;
        }
        self.insert_segments(entry, &segments);
    }

    fn insert_segments(
        &mut self,
        entry: &Arc<Entry>,
        segments: &[&str],
    ) {
        let Some((head, rest)) = segments.split_first() else {
            self.entry = Some(Arc::downgrade(entry));
            return;
        };

        let parent_path = &self.key_path;
        let child = self
            .children
            .entry((*head).to_string())
            .or_insert_with(|| KeyTree::node((*head).to_string(), format!("{parent_path}/{head}")));
        child.insert_segments(entry, rest);
    }

    /// Looks up the node for a full key.
    pub fn find(
        &self,
        full_key: &str,
    ) -> Option<&KeyTree> {
        split_key(full_key).try_fold(self, |node, segment| node.children.get(segment))
    }

    fn is_hidden(&self) -> bool {
        self.key.starts_with(HIDDEN_SEGMENT_PREFIX)
    }

    /// True when this node's path or any descendant's path contains `filter`,
    /// compared case-insensitively. Hidden nodes never match.
    pub fn matches(
        &self,
        filter: &str,
    ) -> bool {
        self.matches_lowercase(&filter.to_lowercase())
    }

    fn matches_lowercase(
        &self,
        needle: &str,
    ) -> bool {
        if self.is_hidden() {
            return false;
        }
        self.key_path.to_lowercase().contains(needle) || self.children.values().any(|c| c.matches_lowercase(needle))
    }

    /// Depth-first walk over all descendants in insertion order. The root
    /// itself is not visited; its children have depth 0.
    pub fn walk<F>(
        &self,
        mut visitor: F,
    ) where
        F: FnMut(&KeyTree, usize),
    {
        for child in self.children.values() {
            child.walk_inner(&mut visitor, 0);
        }
    }

    fn walk_inner<F>(
        &self,
        visitor: &mut F,
        depth: usize,
    ) where
        F: FnMut(&KeyTree, usize),
    {
        visitor(self, depth);
        for child in self.children.values() {
            child.walk_inner(visitor, depth + 1);
        }
    }

    /// Rows to display for `filter`: the walk with non-matching subtrees
    /// pruned.
    pub fn visible_rows(
        &self,
        filter: &str,
    ) -> Vec<TreeRow<'_>> {
        let needle = filter.to_lowercase();
        let mut rows = Vec::new();
        for child in self.children.values() {
            child.collect_visible(&needle, 0, &mut rows);
        }
        rows
    }

    fn collect_visible<'a>(
        &'a self,
        needle: &str,
        depth: usize,
        rows: &mut Vec<TreeRow<'a>>,
    ) {
        if !self.matches_lowercase(needle) {
            return;
        }
        rows.push(TreeRow { depth, node: self });
        for child in self.children.values() {
            child.collect_visible(needle, depth + 1, rows);
        }
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        self.children.values().map(|c| 1 + c.node_count()).sum()
    }
}

impl Default for KeyTree {
    fn default() -> Self {
        Self::root()
    }
}

fn split_key(full_key: &str) -> impl Iterator<Item = &str> {
    full_key.split(KEY_SEPARATOR).filter(|s| !s.is_empty())
}
