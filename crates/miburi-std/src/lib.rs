//! miburi-std: filesystem and CLI support for miburi
//!
//! This crate provides the parts of miburi that need the standard library:
//! the snapshot store, the directory schema loader, replayed walks, and the
//! output formats used by the `miburi` binary.

pub mod loader;
pub mod replay;
pub mod report;
pub mod snapshot;

pub use miburi_core;
