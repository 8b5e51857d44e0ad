//! Schema entry model.
//!
//! A loaded MIB module is flattened into a [`SchemaEntry`]: its header, the
//! object nodes it defines (each with a full numeric path), and the types it
//! declares. The loader produces these; the snapshot store persists them and
//! the index borrows them.
//!
//! ```text
//! loader → [SchemaEntry] → snapshot (write)
//!                        → OidIndex → resolve()
//! ```

mod module;
mod node;
mod oid;
mod types;

pub use module::{ModuleInfo, SchemaEntry};
pub use node::{NodeKind, SchemaNode};
pub use oid::{ancestors, join_arcs, Ancestors, Oid, OidError};
pub use types::{Access, BaseType, EnumValue, Status, TypeInfo};

use alloc::vec::Vec;

/// Total number of nodes across a set of entries.
#[must_use]
pub fn total_nodes(entries: &[SchemaEntry]) -> usize {
    entries.iter().map(SchemaEntry::node_count).sum()
}

/// Number of nodes a walk can return instances of: readable scalars and
/// columns.
#[must_use]
pub fn readable_objects(entries: &[SchemaEntry]) -> usize {
    entries
        .iter()
        .flat_map(|e| &e.nodes)
        .filter(|n| n.kind.has_instances() && n.access.as_ref().is_some_and(Access::is_readable))
        .count()
}

/// Names of modules that appear more than once, in first-seen order.
///
/// A loader pointed at overlapping directories can produce these; the index
/// still accepts them (see [`crate::index`]).
#[must_use]
pub fn duplicate_modules(entries: &[SchemaEntry]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    let mut dups: Vec<&str> = Vec::new();
    for entry in entries {
        let name = entry.name();
        if seen.contains(&name) {
            if !dups.contains(&name) {
                dups.push(name);
            }
        } else {
            seen.push(name);
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry(name: &str, nodes: usize) -> SchemaEntry {
        let mut e = SchemaEntry::new(ModuleInfo::new(name));
        for i in 0..nodes {
            e.add_node(SchemaNode::new(Oid::new(vec![1, i as u32]), "n", name));
        }
        e
    }

    #[test]
    fn test_total_nodes() {
        let entries = vec![entry("A-MIB", 2), entry("B-MIB", 3)];
        assert_eq!(total_nodes(&entries), 5);
        assert_eq!(total_nodes(&[]), 0);
    }

    #[test]
    fn test_readable_objects() {
        let mut e = SchemaEntry::new(ModuleInfo::new("IF-MIB"));
        let node = |arc: u32, name: &str| SchemaNode::new(Oid::new(vec![1, 3, arc]), name, "IF-MIB");
        e.add_node(node(1, "ifTable").with_kind(NodeKind::Table).with_access(Access::NotAccessible));
        e.add_node(node(2, "ifDescr").with_kind(NodeKind::Column).with_access(Access::ReadOnly));
        e.add_node(node(3, "ifIndexAux").with_kind(NodeKind::Column).with_access(Access::NotAccessible));
        e.add_node(node(4, "ifNumber").with_kind(NodeKind::Scalar).with_access(Access::ReadOnly));
        e.add_node(node(5, "ifNoAccess").with_kind(NodeKind::Scalar));
        assert_eq!(readable_objects(&[e]), 2);
    }

    #[test]
    fn test_duplicate_modules() {
        let entries = vec![entry("A-MIB", 0), entry("B-MIB", 0), entry("A-MIB", 0), entry("A-MIB", 0)];
        assert_eq!(duplicate_modules(&entries), vec!["A-MIB"]);
    }
}
