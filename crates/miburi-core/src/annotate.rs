//! Annotation of walk results with MIB names and metadata.

use crate::index::OidIndex;
use crate::resolve::{canonicalize, resolve, ResolvedName};
use crate::transport::{Session, Transport, TransportError};
use crate::value::VarBind;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// One annotated varbind (or one looked-up OID, without a value).
///
/// Serialized field names follow the columns of the text and CSV output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotatedResult {
    /// OID with the leading dot and `iso` label normalised away.
    #[cfg_attr(feature = "serde", serde(rename = "OID"))]
    pub oid: String,
    /// Symbolic name with instance suffix; empty when unresolved.
    #[cfg_attr(feature = "serde", serde(rename = "Name"))]
    pub name: String,
    /// Owning module; empty when unresolved.
    #[cfg_attr(feature = "serde", serde(rename = "MIB"))]
    pub module: String,
    /// Value type tag, or the syntax name for a plain lookup.
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub type_tag: String,
    /// Human-readable value.
    #[cfg_attr(feature = "serde", serde(rename = "Value"))]
    pub value: String,
    /// `label = value, ...` (verbose only).
    #[cfg_attr(feature = "serde", serde(rename = "Enum"))]
    pub enumeration: Option<String>,
    /// Units (verbose only).
    #[cfg_attr(feature = "serde", serde(rename = "Unit"))]
    pub units: Option<String>,
    /// Description (verbose only).
    #[cfg_attr(feature = "serde", serde(rename = "Desc"))]
    pub description: Option<String>,
}

impl AnnotatedResult {
    /// Check whether the OID resolved to a name.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Attaches resolved names to varbinds.
#[derive(Clone, Copy, Debug)]
pub struct Annotator<'i, 'a> {
    index: &'i OidIndex<'a>,
    verbose: bool,
}

impl<'i, 'a> Annotator<'i, 'a> {
    /// Create an annotator over `index`. Not verbose by default.
    #[must_use]
    pub fn new(index: &'i OidIndex<'a>) -> Self {
        Self {
            index,
            verbose: false,
        }
    }

    /// Also copy enumeration, units and description of resolved nodes.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Annotate one varbind. `None` for the end-of-walk marker.
    #[must_use]
    pub fn annotate(&self, varbind: &VarBind) -> Option<AnnotatedResult> {
        if varbind.value.is_end_of_mib_view() {
            return None;
        }
        let resolved = resolve(self.index, &varbind.oid);
        if !resolved.is_found() {
            tracing::debug!(oid = %varbind.oid, "no MIB name for OID");
        }
        let mut result = AnnotatedResult {
            oid: canonicalize(&varbind.oid),
            module: resolved.module().map(String::from).unwrap_or_default(),
            type_tag: varbind.value.type_tag().to_string(),
            value: varbind.value.to_string(),
            ..AnnotatedResult::default()
        };
        self.fill_metadata(&mut result, &resolved);
        result.name = resolved.symbolic_name;
        Some(result)
    }

    /// Look up an OID without a value. `None` when no ancestor is indexed.
    ///
    /// The type column carries the syntax name of the matched node.
    #[must_use]
    pub fn describe(&self, raw_oid: &str) -> Option<AnnotatedResult> {
        let resolved = resolve(self.index, raw_oid);
        let node = resolved.node?;
        let mut result = AnnotatedResult {
            oid: raw_oid.to_string(),
            module: node.module.clone(),
            type_tag: node
                .type_info
                .as_ref()
                .map(|t| t.display_name().to_string())
                .unwrap_or_default(),
            ..AnnotatedResult::default()
        };
        self.fill_metadata(&mut result, &resolved);
        result.name = resolved.symbolic_name;
        Some(result)
    }

    /// Walk `root` through `session`, pushing one result per varbind onto
    /// `out` as it arrives. Returns the number pushed.
    ///
    /// # Errors
    ///
    /// Returns the transport error that stopped the walk. Results pushed
    /// before the failure stay in `out`.
    pub fn walk<T: Transport>(
        &self,
        session: &mut Session<T>,
        root: &str,
        out: &mut Vec<AnnotatedResult>,
    ) -> Result<usize, TransportError> {
        let mut count = 0;
        for varbind in session.walk(root)? {
            let varbind = varbind?;
            match self.annotate(&varbind) {
                Some(result) => {
                    out.push(result);
                    count += 1;
                }
                None => break,
            }
        }
        tracing::debug!(root, count, "walk complete");
        Ok(count)
    }

    fn fill_metadata(&self, result: &mut AnnotatedResult, resolved: &ResolvedName<'_>) {
        if !self.verbose {
            return;
        }
        let Some(node) = resolved.node else {
            return;
        };
        if let Some(type_info) = &node.type_info {
            result.enumeration = type_info.enum_summary();
            result.units = type_info.units.clone();
        }
        result.description = node.effective_description().map(String::from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseType, ModuleInfo, Oid, SchemaEntry, SchemaNode, TypeInfo};
    use crate::transport::{MemoryTransport, Target};
    use crate::value::Value;
    use alloc::vec;

    fn entries() -> Vec<SchemaEntry> {
        let mut if_mib = SchemaEntry::new(ModuleInfo::new("IF-MIB"));
        if_mib.add_node(
            SchemaNode::new(Oid::new(vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 7]), "ifAdminStatus", "IF-MIB")
                .with_description("The desired state of the interface.")
                .with_type(
                    TypeInfo::new("INTEGER")
                        .with_base(BaseType::Enumeration)
                        .with_enum("up", 1)
                        .with_enum("down", 2)
                        .with_enum("testing", 3),
                ),
        );
        if_mib.add_node(
            SchemaNode::new(Oid::new(vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 5]), "ifSpeed", "IF-MIB")
                .with_type(TypeInfo::new("Gauge32").with_units("bits per second")),
        );
        vec![if_mib]
    }

    #[test]
    fn test_annotate_plain() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index);

        let vb = VarBind::new(".1.3.6.1.2.1.2.2.1.7.3", Value::Integer(1));
        let result = annotator.annotate(&vb).unwrap();

        assert_eq!(result.oid, "1.3.6.1.2.1.2.2.1.7.3");
        assert_eq!(result.name, "ifAdminStatus.3");
        assert_eq!(result.module, "IF-MIB");
        assert_eq!(result.type_tag, "Integer");
        assert_eq!(result.value, "1");
        assert!(result.enumeration.is_none());
        assert!(result.description.is_none());
    }

    #[test]
    fn test_annotate_verbose() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index).verbose(true);

        let result = annotator
            .annotate(&VarBind::new("1.3.6.1.2.1.2.2.1.7.3", Value::Integer(2)))
            .unwrap();
        assert_eq!(result.enumeration.as_deref(), Some("up = 1, down = 2, testing = 3"));
        assert_eq!(result.description.as_deref(), Some("The desired state of the interface."));
        assert!(result.units.is_none());

        let result = annotator
            .annotate(&VarBind::new("1.3.6.1.2.1.2.2.1.5.1", Value::Gauge32(1_000_000_000)))
            .unwrap();
        assert_eq!(result.units.as_deref(), Some("bits per second"));
        assert!(result.enumeration.is_none());
    }

    #[test]
    fn test_annotate_unresolved() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index).verbose(true);

        let result = annotator
            .annotate(&VarBind::new("1.3.6.1.4.1.9.1", Value::OctetString(b"x".to_vec())))
            .unwrap();
        assert!(!result.is_resolved());
        assert_eq!(result.module, "");
        assert_eq!(result.value, "x");
        assert!(result.description.is_none());
    }

    #[test]
    fn test_annotate_end_of_mib_view() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index);

        assert!(annotator
            .annotate(&VarBind::new("1.3.6.1.2.1.2", Value::EndOfMibView))
            .is_none());
    }

    #[test]
    fn test_describe() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index).verbose(true);

        let result = annotator.describe(".1.3.6.1.2.1.2.2.1.7").unwrap();
        assert_eq!(result.oid, ".1.3.6.1.2.1.2.2.1.7");
        assert_eq!(result.name, "ifAdminStatus");
        assert_eq!(result.type_tag, "INTEGER");
        assert!(result.enumeration.is_some());

        assert!(annotator.describe("1.3.6.1.4").is_none());
    }

    #[test]
    fn test_walk_collects_until_end() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index);
        let transport = MemoryTransport::new(vec![
            VarBind::new(".1.3.6.1.2.1.2.2.1.7.1", Value::Integer(1)),
            VarBind::new(".1.3.6.1.2.1.2.2.1.7.2", Value::Integer(2)),
            VarBind::new(".1.3.6.1.2.1.1.1.0", Value::OctetString(b"outside".to_vec())),
        ]);
        let mut session = Session::open(transport, Target::default()).unwrap();

        let mut out = Vec::new();
        let count = annotator.walk(&mut session, "1.3.6.1.2.1.2", &mut out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(out[0].name, "ifAdminStatus.1");
        assert_eq!(out[1].name, "ifAdminStatus.2");
    }

    #[test]
    fn test_walk_keeps_partial_results_on_error() {
        let entries = entries();
        let index = OidIndex::build(&entries);
        let annotator = Annotator::new(&index);
        let transport = MemoryTransport::new(vec![
            VarBind::new("1.3.6.1.2.1.2.2.1.7.1", Value::Integer(1)),
            VarBind::new("1.3.6.1.2.1.2.2.1.7.2", Value::Integer(2)),
        ])
        .with_failure_after(1, "timeout");
        let mut session = Session::open(transport, Target::default()).unwrap();

        let mut out = Vec::new();
        let err = annotator.walk(&mut session, "1.3.6.1.2.1.2", &mut out).unwrap_err();

        assert!(matches!(err, TransportError::Walk { .. }));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "ifAdminStatus.1");
    }
}
