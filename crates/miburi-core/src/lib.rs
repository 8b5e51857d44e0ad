//! miburi-core: MIB object index and OID resolution
//!
//! This crate flattens loaded MIB modules into an OID index, resolves
//! numeric (possibly instance-qualified) OIDs to symbolic names by
//! longest-prefix match, and annotates walk results with those names.
//! It is `no_std` compatible and IO-free; the filesystem side lives in
//! `miburi-std`.
//!
//! # Pipeline
//!
//! ```text
//! loader → [SchemaEntry] → OidIndex → resolve() → Annotator ← Session<Transport>
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod annotate;
pub mod index;
pub mod model;
pub mod resolve;
pub mod transport;
pub mod value;

pub use annotate::{AnnotatedResult, Annotator};
pub use index::{OidIndex, PathCollision};
pub use model::{Oid, SchemaEntry, SchemaNode, TypeInfo};
pub use resolve::{canonicalize, parse_oid, resolve, ResolvedName};
pub use transport::{MemoryTransport, Session, Target, Transport, TransportError};
pub use value::{Value, VarBind};
