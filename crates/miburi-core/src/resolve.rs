//! OID → symbolic name resolution.
//!
//! Schema modules name *types* of objects at fixed paths; a walk of a live
//! agent returns *instances*, i.e. those paths extended with index arcs that
//! no module defines. Resolution therefore looks for the deepest indexed
//! ancestor of the queried OID, walking upward one arc at a time, and keeps
//! the unmatched arcs as an instance suffix:
//!
//! ```text
//! 1.3.6.1.2.1.2.2.1.2.3   (query)
//! 1.3.6.1.2.1.2.2.1.2     → ifDescr       (deepest hit)
//!                     .3  → suffix [3]
//! = "ifDescr.3"
//! ```
//!
//! A miss is an ordinary value ([`ResolvedName::is_found`] is false), never an
//! error. Malformed input is a miss as well.

use crate::index::OidIndex;
use crate::model::{ancestors, Oid, SchemaNode};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

/// Textual alias for the numeric root arc.
pub const ROOT_LABEL: &str = "iso";

/// Numeric arc the root label stands for.
pub const ROOT_ARC: &str = "1";

/// Result of resolving one OID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedName<'a> {
    /// Matched node name plus the dotted suffix, e.g. `sysDescr.0`.
    /// Empty when nothing matched.
    pub symbolic_name: String,
    /// The deepest indexed ancestor (or the exact node).
    pub node: Option<&'a SchemaNode>,
    /// Arcs below the matched node.
    pub suffix: Vec<u32>,
}

impl<'a> ResolvedName<'a> {
    /// The empty result.
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Check whether an ancestor was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.node.is_some()
    }

    /// Module of the matched node.
    #[must_use]
    pub fn module(&self) -> Option<&'a str> {
        self.node.map(|n| n.module.as_str())
    }
}

/// Apply the textual normalisations: drop one leading `.`, then replace a
/// leading `iso` component with `1`.
///
/// No validation happens here; see [`parse_oid`].
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    let s = raw.strip_prefix('.').unwrap_or(raw);
    match s.strip_prefix(ROOT_LABEL) {
        Some("") => String::from(ROOT_ARC),
        Some(rest) if rest.starts_with('.') => {
            let mut out = String::with_capacity(rest.len() + 1);
            out.push_str(ROOT_ARC);
            out.push_str(rest);
            out
        }
        _ => String::from(s),
    }
}

/// Canonicalize and parse. `None` for anything that is not a dotted list of
/// 32-bit arcs.
#[must_use]
pub fn parse_oid(raw: &str) -> Option<Oid> {
    Oid::from_dotted(&canonicalize(raw))
}

/// Resolve a raw OID string against the index.
#[must_use]
pub fn resolve<'a>(index: &OidIndex<'a>, raw: &str) -> ResolvedName<'a> {
    match parse_oid(raw) {
        Some(oid) => resolve_arcs(index, oid.arcs()),
        None => {
            tracing::trace!(oid = raw, "malformed OID, treating as not found");
            ResolvedName::not_found()
        }
    }
}

/// Resolve an already-parsed OID.
#[must_use]
pub fn resolve_arcs<'a>(index: &OidIndex<'a>, arcs: &[u32]) -> ResolvedName<'a> {
    // exact match first, then each ancestor down to the single root arc
    for (prefix, suffix) in ancestors(arcs) {
        if let Some(node) = index.get(prefix) {
            let mut symbolic_name = String::with_capacity(node.name.len() + suffix.len() * 4);
            symbolic_name.push_str(&node.name);
            for arc in suffix {
                let _ = write!(symbolic_name, ".{arc}");
            }
            return ResolvedName {
                symbolic_name,
                node: Some(node),
                suffix: suffix.to_vec(),
            };
        }
    }
    ResolvedName::not_found()
}
