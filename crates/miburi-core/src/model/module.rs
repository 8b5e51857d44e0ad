//! Module-level types.

use super::node::SchemaNode;
use super::types::TypeInfo;
use alloc::string::String;
use alloc::vec::Vec;

/// Module header information.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleInfo {
    /// Module name, e.g. `IF-MIB`.
    pub name: String,
    /// LAST-UPDATED value.
    pub last_updated: Option<String>,
    /// ORGANIZATION value.
    pub organization: Option<String>,
    /// CONTACT-INFO value.
    pub contact_info: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// File the module was loaded from.
    pub path: Option<String>,
}

impl ModuleInfo {
    /// Create module info with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One loaded schema module.
///
/// Built once by a loader and not mutated afterwards; both the snapshot store
/// and the index only ever take it by shared reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaEntry {
    /// Module header.
    pub module: ModuleInfo,
    /// Object nodes in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nodes: Vec<SchemaNode>,
    /// Type definitions declared by the module.
    #[cfg_attr(feature = "serde", serde(default))]
    pub types: Vec<TypeInfo>,
}

impl SchemaEntry {
    /// Create an empty entry for a module.
    #[must_use]
    pub fn new(module: ModuleInfo) -> Self {
        Self {
            module,
            nodes: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.module.name
    }

    /// Append a node.
    pub fn add_node(&mut self, node: SchemaNode) {
        self.nodes.push(node);
    }

    /// Append a type definition.
    pub fn add_type(&mut self, typ: TypeInfo) {
        self.types.push(typ);
    }

    /// Get the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
