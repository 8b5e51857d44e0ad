//! Transport seam for live walks.
//!
//! The network protocol itself is not implemented here. A [`Transport`]
//! yields varbinds for a root OID in the agent's traversal order; a
//! [`Session`] owns one and guarantees it is closed on every exit path,
//! including a failed walk.
//!
//! ```ignore
//! let mut session = Session::open(transport, Target::new("192.0.2.1"))?;
//! for varbind in session.walk("1.3.6.1.2.1.1")? {
//!     let varbind = varbind?;
//!     // ...
//! }
//! // transport closed when `session` drops
//! ```

use crate::model::Oid;
use crate::resolve::parse_oid;
use crate::value::{Value, VarBind};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be set up.
    #[error("failed to connect to {target}: {reason}")]
    Connect {
        /// `host:port` of the agent.
        target: String,
        /// Transport-specific reason.
        reason: String,
    },
    /// A walk failed part way through.
    #[error("walk of {root} failed: {reason}")]
    Walk {
        /// Root OID of the walk.
        root: String,
        /// Transport-specific reason.
        reason: String,
    },
    /// The transport was used before `connect` or after `close`.
    #[error("transport is not connected")]
    NotConnected,
}

/// Agent address and credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Host name or address.
    pub host: String,
    /// SNMPv2c community.
    pub community: String,
    /// UDP port.
    pub port: u16,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for Target {
    fn default() -> Self {
        Self::new("localhost")
    }
}

impl Target {
    /// Target with default community, port and timeout.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            community: String::from("public"),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the community string.
    #[must_use]
    pub fn community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Varbinds of one walk, in traversal order.
pub type Walk<'a> = Box<dyn Iterator<Item = Result<VarBind, TransportError>> + 'a>;

/// A source of walk results.
///
/// Implementations may batch or paginate internally; callers only see one
/// varbind at a time. A walk ends when the iterator is exhausted or yields
/// an [`Value::EndOfMibView`] varbind. No retries happen above this trait.
pub trait Transport {
    /// Open the connection.
    fn connect(&mut self, target: &Target) -> Result<(), TransportError>;

    /// Walk the subtree under `root`.
    fn walk(&mut self, root: &str) -> Result<Walk<'_>, TransportError>;

    /// Tear the connection down. Must be idempotent.
    fn close(&mut self);
}

/// A connected transport, closed when dropped.
pub struct Session<T: Transport> {
    transport: T,
    target: Target,
}

impl<T: Transport> Session<T> {
    /// Connect `transport` to `target`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the connection fails. The transport
    /// is closed before returning.
    pub fn open(mut transport: T, target: Target) -> Result<Self, TransportError> {
        if let Err(err) = transport.connect(&target) {
            transport.close();
            return Err(err);
        }
        tracing::debug!(target_addr = %target.address(), "session opened");
        Ok(Self { transport, target })
    }

    /// The connected target.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Walk the subtree under `root`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the walk cannot start.
    pub fn walk(&mut self, root: &str) -> Result<Walk<'_>, TransportError> {
        self.transport.walk(root)
    }

    /// Close explicitly. Equivalent to dropping the session.
    pub fn close(self) {}
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.transport.close();
        tracing::debug!(target_addr = %self.target.address(), "session closed");
    }
}

/// In-memory transport over a fixed set of varbinds.
///
/// Varbinds are kept in OID order; a walk yields those at or below the root
/// followed by `EndOfMibView`. Useful for tests and for replaying captured
/// walks.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    entries: Vec<(Oid, VarBind)>,
    connected: bool,
    connect_error: Option<String>,
    fail_after: Option<(usize, String)>,
}

impl MemoryTransport {
    /// Create a transport over `varbinds`. Varbinds whose OID does not parse
    /// are dropped.
    #[must_use]
    pub fn new(varbinds: impl IntoIterator<Item = VarBind>) -> Self {
        let mut entries: Vec<(Oid, VarBind)> = varbinds
            .into_iter()
            .filter_map(|vb| match parse_oid(&vb.oid) {
                Some(oid) => Some((oid, vb)),
                None => {
                    tracing::warn!(oid = %vb.oid, "dropping varbind with malformed OID");
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Make `connect` fail with `reason`.
    #[must_use]
    pub fn with_connect_error(mut self, reason: impl Into<String>) -> Self {
        self.connect_error = Some(reason.into());
        self
    }

    /// Make every walk fail after yielding `count` varbinds.
    #[must_use]
    pub fn with_failure_after(mut self, count: usize, reason: impl Into<String>) -> Self {
        self.fail_after = Some((count, reason.into()));
        self
    }

    /// Number of varbinds held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no varbinds are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, target: &Target) -> Result<(), TransportError> {
        if let Some(reason) = &self.connect_error {
            return Err(TransportError::Connect {
                target: target.address(),
                reason: reason.clone(),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn walk(&mut self, root: &str) -> Result<Walk<'_>, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        let root_oid = parse_oid(root).ok_or_else(|| TransportError::Walk {
            root: String::from(root),
            reason: String::from("malformed root OID"),
        })?;

        let matching = self
            .entries
            .iter()
            .filter(move |(oid, _)| root_oid.is_prefix_of(oid))
            .map(|(_, vb)| Ok(vb.clone()));

        match &self.fail_after {
            Some((count, reason)) => {
                let err = TransportError::Walk {
                    root: String::from(root),
                    reason: reason.clone(),
                };
                Ok(Box::new(matching.take(*count).chain(core::iter::once(Err(err)))))
            }
            None => {
                let end = VarBind::new(root, Value::EndOfMibView);
                Ok(Box::new(matching.chain(core::iter::once(Ok(end)))))
            }
        }
    }

    fn close(&mut self) {
        self.connected = false;
    }
}
