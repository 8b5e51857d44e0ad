//! Varbind values as delivered by a transport.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A typed value from a walk response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// OCTET STRING.
    OctetString(Vec<u8>),
    /// INTEGER / Integer32.
    Integer(i64),
    /// OBJECT IDENTIFIER, dotted.
    ObjectIdentifier(String),
    /// IpAddress.
    IpAddress([u8; 4]),
    /// Counter32.
    Counter32(u32),
    /// Gauge32 / Unsigned32.
    Gauge32(u32),
    /// TimeTicks (hundredths of a second).
    TimeTicks(u32),
    /// Counter64.
    Counter64(u64),
    /// Opaque.
    Opaque(Vec<u8>),
    /// NULL.
    Null,
    /// Exception: no such object.
    NoSuchObject,
    /// Exception: no such instance.
    NoSuchInstance,
    /// Exception: end of the agent's MIB view. Terminates a walk.
    EndOfMibView,
    /// A tag the transport could not classify.
    Unknown,
}

impl Value {
    /// Type tag shown to users.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::OctetString(_) => "OctetString",
            Self::Integer(_) => "Integer",
            Self::ObjectIdentifier(_) => "ObjectIdentifier",
            Self::IpAddress(_) => "IPAddress",
            Self::Counter32(_) => "Counter32",
            Self::Gauge32(_) => "Gauge32",
            Self::TimeTicks(_) => "TimeTicks",
            Self::Counter64(_) => "Counter64",
            Self::Opaque(_) => "Opaque",
            Self::Null => "Null",
            Self::NoSuchObject => "NoSuchObject",
            Self::NoSuchInstance => "NoSuchInstance",
            Self::EndOfMibView => "EndOfMibView",
            Self::Unknown => "Unknown",
        }
    }

    /// Check for the end-of-walk marker.
    #[must_use]
    pub fn is_end_of_mib_view(&self) -> bool {
        matches!(self, Self::EndOfMibView)
    }
}

/// Octet strings print as text when they are valid UTF-8 and as
/// `(hex) 0a 1b ...` otherwise.
fn fmt_octets(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if let Ok(text) = core::str::from_utf8(bytes) {
        return f.write_str(text);
    }
    f.write_str("(hex) ")?;
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OctetString(bytes) | Self::Opaque(bytes) => fmt_octets(f, bytes),
            Self::Integer(v) => write!(f, "{v}"),
            Self::ObjectIdentifier(oid) => f.write_str(oid),
            Self::IpAddress([a, b, c, d]) => write!(f, "{a}.{b}.{c}.{d}"),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => write!(f, "{v}"),
            Self::Counter64(v) => write!(f, "{v}"),
            Self::Null | Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView | Self::Unknown => Ok(()),
        }
    }
}

/// An `(OID, value)` pair from a walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarBind {
    /// OID as the transport reported it (leading dot allowed).
    pub oid: String,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new varbind.
    #[must_use]
    pub fn new(oid: impl Into<String>, value: Value) -> Self {
        Self {
            oid: oid.into(),
            value,
        }
    }
}
