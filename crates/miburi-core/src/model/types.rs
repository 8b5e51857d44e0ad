//! Type definitions attached to schema nodes.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

/// Primitive syntax underneath a (possibly derived) type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseType {
    Integer32,
    Counter32,
    Counter64,
    Gauge32,
    Unsigned32,
    /// Hundredths of a second.
    TimeTicks,
    IpAddress,
    Opaque,
    OctetString,
    ObjectIdentifier,
    /// Named bits over an OCTET STRING.
    Bits,
    /// INTEGER restricted to named numbers.
    Enumeration,
    /// Row syntax; never the type of a value.
    Sequence,
}

impl BaseType {
    /// ASN.1 / SMI keyword as written in a module, e.g. `OCTET STRING`.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Integer32 => "Integer32",
            Self::Enumeration => "INTEGER",
            Self::Counter32 => "Counter32",
            Self::Counter64 => "Counter64",
            Self::Gauge32 => "Gauge32",
            Self::Unsigned32 => "Unsigned32",
            Self::TimeTicks => "TimeTicks",
            Self::IpAddress => "IpAddress",
            Self::Opaque => "Opaque",
            Self::OctetString => "OCTET STRING",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::Bits => "BITS",
            Self::Sequence => "SEQUENCE",
        }
    }
}

/// One named number of an enumerated INTEGER (or a named bit of BITS).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumValue {
    /// Symbolic label, e.g. `up`.
    pub label: String,
    /// Numeric value, e.g. `1`.
    pub value: i64,
}

impl EnumValue {
    #[must_use]
    pub fn new(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// STATUS clause. SMIv1 modules use `mandatory` / `optional`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
    Mandatory,
    Optional,
}

/// MAX-ACCESS (or SMIv1 ACCESS) clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    ReadOnly,
    ReadWrite,
    ReadCreate,
    NotAccessible,
    AccessibleForNotify,
    /// SMIv1 only.
    WriteOnly,
}

impl Access {
    /// Whether an agent returns this object in a walk.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite | Self::ReadCreate)
    }
}

/// A type definition, either declared by a module or referenced by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeInfo {
    /// Type name (`DisplayString`, `IfAdminStatus`, or the base name).
    pub name: String,
    /// Underlying primitive type, when known.
    pub base: Option<BaseType>,
    /// Named numbers in declaration order. Empty when not enumerated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enum_values: Vec<EnumValue>,
    /// UNITS clause.
    pub units: Option<String>,
    /// DISPLAY-HINT.
    pub format: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// Definition status.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Status,
}

impl TypeInfo {
    /// Create a type with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            enum_values: Vec::new(),
            units: None,
            format: None,
            description: None,
            status: Status::Current,
        }
    }

    /// Set the base type.
    #[must_use]
    pub fn with_base(mut self, base: BaseType) -> Self {
        self.base = Some(base);
        self
    }

    /// Append a named number.
    #[must_use]
    pub fn with_enum(mut self, label: impl Into<String>, value: i64) -> Self {
        self.enum_values.push(EnumValue::new(label, value));
        self
    }

    /// Set the units string.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Set the description text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The type name, or the base keyword for an anonymous type.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match (&self.name[..], self.base) {
            ("", Some(base)) => base.keyword(),
            (name, _) => name,
        }
    }

    /// Render the named numbers as `label = value` pairs joined by `", "`,
    /// in declaration order. `None` when the type is not enumerated.
    #[must_use]
    pub fn enum_summary(&self) -> Option<String> {
        if self.enum_values.is_empty() {
            return None;
        }
        let mut out = String::new();
        for (i, e) in self.enum_values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{} = {}", e.label, e.value);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_keyword() {
        assert_eq!(BaseType::Enumeration.keyword(), "INTEGER");
        assert_eq!(BaseType::OctetString.keyword(), "OCTET STRING");
        assert_eq!(BaseType::Counter64.keyword(), "Counter64");
    }

    #[test]
    fn test_readable_access() {
        let readable: Vec<Access> = [
            Access::ReadOnly,
            Access::ReadWrite,
            Access::ReadCreate,
            Access::NotAccessible,
            Access::AccessibleForNotify,
            Access::WriteOnly,
        ]
        .into_iter()
        .filter(Access::is_readable)
        .collect();
        assert_eq!(readable, [Access::ReadOnly, Access::ReadWrite, Access::ReadCreate]);
        assert_eq!(Status::default(), Status::Current);
    }

    #[test]
    fn test_enum_summary_declaration_order() {
        let ty = TypeInfo::new("IfAdminStatus")
            .with_base(BaseType::Enumeration)
            .with_enum("up", 1)
            .with_enum("down", 2)
            .with_enum("testing", 3);

        assert_eq!(
            ty.enum_summary().as_deref(),
            Some("up = 1, down = 2, testing = 3")
        );
    }

    #[test]
    fn test_enum_summary_absent() {
        let ty = TypeInfo::new("DisplayString").with_base(BaseType::OctetString);
        assert!(ty.enum_summary().is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(TypeInfo::new("DisplayString").display_name(), "DisplayString");
        assert_eq!(TypeInfo::new("").with_base(BaseType::Enumeration).display_name(), "INTEGER");
        assert_eq!(TypeInfo::new("").display_name(), "");
    }
}
