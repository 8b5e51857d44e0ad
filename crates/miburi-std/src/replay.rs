//! Recorded walks, replayed through [`MemoryTransport`].
//!
//! A capture is a JSON array of varbinds:
//!
//! ```json
//! [
//!   { "oid": ".1.3.6.1.2.1.1.1.0", "type": "OctetString", "value": "Linux router" },
//!   { "oid": ".1.3.6.1.2.1.1.3.0", "type": "TimeTicks", "value": 123456 },
//!   { "oid": ".1.3.6.1.2.1.2.2.1.6.2", "type": "OctetString", "value": [0, 27, 33, 10, 11, 12] }
//! ]
//! ```
//!
//! Octet strings are given as text or as an array of bytes. Type tags are the
//! ones printed in the `Type` column.

use miburi_core::{MemoryTransport, Value, VarBind};
use serde::Deserialize;
use std::fs;
use std::io;
use std::net::Ipv4Addr;
use std::path::Path;

/// A capture could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The file could not be read.
    #[error("cannot read capture: {0}")]
    Io(#[from] io::Error),
    /// The file is not a JSON array of varbinds.
    #[error("invalid capture JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A value does not fit its type tag.
    #[error("invalid {type_tag} value for {oid}: {reason}")]
    InvalidValue {
        /// OID of the offending varbind.
        oid: String,
        /// Its type tag.
        type_tag: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// One varbind as stored in a capture file.
#[derive(Clone, Debug, Deserialize)]
pub struct CapturedVarBind {
    /// OID as reported by the agent.
    pub oid: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Raw value; absent for `Null` and the exception types.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl CapturedVarBind {
    fn invalid(&self, reason: impl Into<String>) -> ReplayError {
        ReplayError::InvalidValue {
            oid: self.oid.clone(),
            type_tag: self.type_tag.clone(),
            reason: reason.into(),
        }
    }

    fn unsigned<T: TryFrom<u64>>(&self) -> Result<T, ReplayError> {
        self.value
            .as_u64()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| self.invalid("expected an unsigned integer in range"))
    }

    fn text(&self) -> Result<&str, ReplayError> {
        self.value
            .as_str()
            .ok_or_else(|| self.invalid("expected a string"))
    }

    fn octets(&self) -> Result<Vec<u8>, ReplayError> {
        match &self.value {
            serde_json::Value::String(s) => Ok(s.clone().into_bytes()),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| self.invalid("byte array entries must be 0..=255")),
            _ => Err(self.invalid("expected a string or a byte array")),
        }
    }

    /// Convert to a typed varbind.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidValue`] when the value does not fit the
    /// type tag.
    pub fn to_varbind(&self) -> Result<VarBind, ReplayError> {
        let value = match self.type_tag.as_str() {
            "OctetString" => Value::OctetString(self.octets()?),
            "Opaque" => Value::Opaque(self.octets()?),
            "Integer" => Value::Integer(
                self.value
                    .as_i64()
                    .ok_or_else(|| self.invalid("expected an integer"))?,
            ),
            "ObjectIdentifier" => Value::ObjectIdentifier(self.text()?.to_string()),
            "IPAddress" | "IpAddress" => {
                let addr: Ipv4Addr = self
                    .text()?
                    .parse()
                    .map_err(|e: std::net::AddrParseError| self.invalid(e.to_string()))?;
                Value::IpAddress(addr.octets())
            }
            "Counter32" => Value::Counter32(self.unsigned()?),
            "Gauge32" | "Unsigned32" => Value::Gauge32(self.unsigned()?),
            "TimeTicks" => Value::TimeTicks(self.unsigned()?),
            "Counter64" => Value::Counter64(self.unsigned()?),
            "Null" => Value::Null,
            "NoSuchObject" => Value::NoSuchObject,
            "NoSuchInstance" => Value::NoSuchInstance,
            "EndOfMibView" => Value::EndOfMibView,
            other => {
                tracing::warn!(oid = %self.oid, type_tag = other, "unknown value type in capture");
                Value::Unknown
            }
        };
        Ok(VarBind::new(self.oid.clone(), value))
    }
}

/// Parse a capture from JSON text.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a value does not fit its
/// type tag.
pub fn parse_capture(json: &str) -> Result<Vec<VarBind>, ReplayError> {
    let captured: Vec<CapturedVarBind> = serde_json::from_str(json)?;
    captured.iter().map(CapturedVarBind::to_varbind).collect()
}

/// Load a capture file into a transport that replays it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_capture<P: AsRef<Path>>(path: P) -> Result<MemoryTransport, ReplayError> {
    let json = fs::read_to_string(path.as_ref())?;
    let varbinds = parse_capture(&json)?;
    tracing::debug!(path = %path.as_ref().display(), varbinds = varbinds.len(), "capture loaded");
    Ok(MemoryTransport::new(varbinds))
}
