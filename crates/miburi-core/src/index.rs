//! Flat OID index over loaded schema entries.
//!
//! The index maps a node's full path to the node. It has no notion of
//! ancestry: parents are recovered at lookup time by truncating the queried
//! path (see [`crate::resolve`]).
//!
//! # Collisions
//!
//! When two nodes share a path, whether across modules or within one, the node
//! indexed later replaces the earlier one. Every replacement is recorded in
//! [`OidIndex::collisions`] and logged at `warn`.

use crate::model::{Oid, SchemaEntry, SchemaNode};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A node replaced by a later node at the same path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathCollision {
    /// The shared path.
    pub path: Oid,
    /// Module of the replaced node.
    pub replaced_module: String,
    /// Name of the replaced node.
    pub replaced_name: String,
    /// Module of the node that now owns the path.
    pub winner_module: String,
    /// Name of the node that now owns the path.
    pub winner_name: String,
}

/// Path → node mapping, rebuilt for every resolution session.
#[derive(Clone, Debug, Default)]
pub struct OidIndex<'a> {
    by_path: BTreeMap<&'a [u32], &'a SchemaNode>,
    collisions: Vec<PathCollision>,
}

impl<'a> OidIndex<'a> {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_path: BTreeMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Index every node of every entry, in order. Later nodes win on
    /// identical paths.
    #[must_use]
    pub fn build(entries: &'a [SchemaEntry]) -> Self {
        let mut index = Self::new();
        for entry in entries {
            index.extend(entry);
        }
        tracing::debug!(
            modules = entries.len(),
            nodes = index.len(),
            collisions = index.collisions.len(),
            "built OID index"
        );
        index
    }

    /// Index the nodes of one entry.
    pub fn extend(&mut self, entry: &'a SchemaEntry) {
        for node in &entry.nodes {
            self.insert(node);
        }
    }

    /// Insert a node, replacing any node already at its path.
    pub fn insert(&mut self, node: &'a SchemaNode) {
        if let Some(previous) = self.by_path.insert(node.path.arcs(), node) {
            tracing::warn!(
                oid = %node.path,
                replaced_module = %previous.module,
                replaced_name = %previous.name,
                winner_module = %node.module,
                winner_name = %node.name,
                "duplicate OID path, later definition wins"
            );
            self.collisions.push(PathCollision {
                path: node.path.clone(),
                replaced_module: previous.module.clone(),
                replaced_name: previous.name.clone(),
                winner_module: node.module.clone(),
                winner_name: node.name.clone(),
            });
        }
    }

    /// Get the node registered at exactly this path.
    #[must_use]
    pub fn get(&self, arcs: &[u32]) -> Option<&'a SchemaNode> {
        self.by_path.get(arcs).copied()
    }

    /// Replacements made while building.
    #[must_use]
    pub fn collisions(&self) -> &[PathCollision] {
        &self.collisions
    }

    /// Number of distinct paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
