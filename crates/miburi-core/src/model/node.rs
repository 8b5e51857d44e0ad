//! Schema node types.

use super::oid::Oid;
use super::types::{Access, Status, TypeInfo};
use alloc::string::String;

/// What kind of definition produced a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Path segment with no definition of its own.
    #[default]
    Internal,
    /// OBJECT IDENTIFIER value, OBJECT-IDENTITY or MODULE-IDENTITY.
    Node,
    Scalar,
    Table,
    Row,
    Column,
    Notification,
    Group,
    Compliance,
    Capabilities,
}

impl NodeKind {
    /// Scalars and columns carry values; their instances are what a walk
    /// returns.
    #[must_use]
    pub fn has_instances(&self) -> bool {
        matches!(self, Self::Scalar | Self::Column)
    }
}

/// One object definition from a schema module.
///
/// `path` is the index key and is never rewritten after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaNode {
    /// Full numeric path.
    pub path: Oid,
    /// Symbolic name, unique within the defining module only.
    pub name: String,
    /// Name of the owning module.
    pub module: String,
    /// Inferred node kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: NodeKind,
    /// MAX-ACCESS, for object types.
    pub access: Option<Access>,
    /// Definition status.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Status,
    /// Description text of the definition itself.
    pub description: Option<String>,
    /// Syntax of the object, when it has one.
    pub type_info: Option<TypeInfo>,
}

impl SchemaNode {
    /// Create a node with no type information.
    #[must_use]
    pub fn new(path: Oid, name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
            module: module.into(),
            kind: NodeKind::Node,
            access: None,
            status: Status::Current,
            description: None,
            type_info: None,
        }
    }

    /// Set the node kind.
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the access level.
    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    /// Set the description text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach type information.
    #[must_use]
    pub fn with_type(mut self, type_info: TypeInfo) -> Self {
        self.type_info = Some(type_info);
        self
    }

    /// Canonical dotted form of the path.
    #[must_use]
    pub fn oid_string(&self) -> String {
        self.path.to_dotted()
    }

    /// Description of the node, falling back to its type's description.
    #[must_use]
    pub fn effective_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or_else(|| self.type_info.as_ref()?.description.as_deref())
    }
}
