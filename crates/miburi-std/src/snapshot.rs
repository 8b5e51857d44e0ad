//! Snapshot store with fingerprint support.
//!
//! A snapshot is the persisted form of every loaded [`SchemaEntry`], so that
//! `find` and `walk` can resolve names without loading modules again. Two
//! workflows are supported:
//!
//! 1. **Dump → query**: `miburi dump` loads the module files and writes a
//!    snapshot; later commands read it back without verification.
//!
//! 2. **Check against sources**: compute a fingerprint over the module files
//!    and compare it with the one embedded at dump time.
//!
//! # File Format
//!
//! Snapshot files use the `.snap` extension by convention:
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (9 or 41 bytes)                 │
//! │   magic: [u8; 4]        "MIBR"         │
//! │   version: u32 (LE)     Format version │
//! │   has_fingerprint: u8   0 or 1         │
//! │   fingerprint: [u8; 32] (if present)   │
//! ├────────────────────────────────────────┤
//! │ Payload (postcard Vec<SchemaEntry>)    │
//! └────────────────────────────────────────┘
//! ```
//!
//! The header is checked in full before the payload is decoded, so a stale
//! or foreign file is rejected without returning partial entries.
//!
//! # Example
//!
//! ```ignore
//! let report = DirectoryLoader::new().load_all(&dirs)?;
//! let fp = compute_fingerprint(&report.sources);
//! write_snapshot("miburi.snap", &report.entries, Some(fp))?;
//!
//! let entries = read_snapshot("miburi.snap")?;
//! ```

use miburi_core::SchemaEntry;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Current format version. Bump on any breaking change to the payload.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Magic bytes identifying a snapshot file.
const MAGIC: [u8; 4] = *b"MIBR";

/// magic(4) + version(4) + has_fingerprint(1)
const BASE_HEADER_LEN: usize = 9;

const FINGERPRINT_LEN: usize = 32;

/// Snapshot error.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// File could not be read or written.
    #[error("snapshot IO error: {0}")]
    Io(#[from] io::Error),
    /// Payload could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] postcard::Error),
    /// Payload could not be decoded.
    #[error("corrupt snapshot payload: {0}")]
    Decode(#[source] postcard::Error),
    /// File does not start with the expected magic bytes.
    #[error("not a snapshot file (expected MIBR magic)")]
    InvalidMagic,
    /// Header is shorter than its declared layout.
    #[error("truncated snapshot header")]
    TruncatedHeader,
    /// Snapshot was written by a different format version.
    #[error(
        "snapshot format version {found} does not match {expected}; regenerate it with `miburi dump`"
    )]
    VersionMismatch {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },
    /// Embedded fingerprint does not match the expected one.
    #[error("snapshot fingerprint does not match the schema sources")]
    FingerprintMismatch,
}

/// Compute a fingerprint from schema source files.
///
/// The fingerprint includes the format version so that bumping the version
/// also invalidates stored fingerprints. Files are sorted by name for
/// determinism.
///
/// # Arguments
///
/// * `files` - Pairs of `(file name, content)` for all source files
pub fn compute_fingerprint<S: AsRef<str>, B: AsRef<[u8]>>(files: &[(S, B)]) -> [u8; 32] {
    let mut sorted: Vec<_> = files.iter().collect();
    sorted.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let mut hasher = Sha256::new();
    hasher.update(SNAPSHOT_VERSION.to_le_bytes());
    for (name, content) in sorted {
        let content = content.as_ref();
        hasher.update(name.as_ref().as_bytes());
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(content);
    }

    hasher.finalize().into()
}

/// Serialize entries to snapshot bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if postcard rejects the payload.
pub fn serialize_snapshot(
    entries: &[SchemaEntry],
    fingerprint: Option<[u8; 32]>,
) -> Result<Vec<u8>, SnapshotError> {
    let payload = postcard::to_allocvec(entries).map_err(SnapshotError::Encode)?;

    let mut bytes = Vec::with_capacity(BASE_HEADER_LEN + FINGERPRINT_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    match fingerprint {
        Some(fp) => {
            bytes.push(1);
            bytes.extend_from_slice(&fp);
        }
        None => bytes.push(0),
    }
    bytes.extend_from_slice(&payload);

    Ok(bytes)
}

/// Parsed header: stored fingerprint and payload offset.
struct Header {
    fingerprint: Option<[u8; 32]>,
    payload_start: usize,
}

fn parse_header(bytes: &[u8]) -> Result<Header, SnapshotError> {
    if bytes.len() < BASE_HEADER_LEN {
        return Err(SnapshotError::TruncatedHeader);
    }
    if bytes[0..4] != MAGIC {
        return Err(SnapshotError::InvalidMagic);
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: version,
        });
    }

    if bytes[8] == 0 {
        return Ok(Header {
            fingerprint: None,
            payload_start: BASE_HEADER_LEN,
        });
    }

    let end = BASE_HEADER_LEN + FINGERPRINT_LEN;
    let mut fp = [0u8; FINGERPRINT_LEN];
    fp.copy_from_slice(bytes.get(BASE_HEADER_LEN..end).ok_or(SnapshotError::TruncatedHeader)?);
    Ok(Header {
        fingerprint: Some(fp),
        payload_start: end,
    })
}

/// Deserialize entries from snapshot bytes.
///
/// # Arguments
///
/// * `bytes` - Snapshot file contents
/// * `expected_fingerprint` - If `Some`, the stored fingerprint must match;
///   if `None`, verification is skipped
///
/// # Errors
///
/// Returns an error if:
/// - the magic bytes don't match
/// - the format version doesn't match
/// - the fingerprint doesn't match (when verification is requested)
/// - postcard decoding fails
pub fn deserialize_snapshot(
    bytes: &[u8],
    expected_fingerprint: Option<&[u8; 32]>,
) -> Result<Vec<SchemaEntry>, SnapshotError> {
    let header = parse_header(bytes)?;

    if let Some(expected) = expected_fingerprint {
        if header.fingerprint.as_ref() != Some(expected) {
            return Err(SnapshotError::FingerprintMismatch);
        }
    }

    postcard::from_bytes(&bytes[header.payload_start..]).map_err(SnapshotError::Decode)
}

/// Get the fingerprint from snapshot bytes without decoding the payload.
///
/// Returns `None` if the snapshot has no embedded fingerprint.
///
/// # Errors
///
/// Returns an error if the header is invalid.
pub fn get_fingerprint(bytes: &[u8]) -> Result<Option<[u8; 32]>, SnapshotError> {
    parse_header(bytes).map(|h| h.fingerprint)
}

/// Write entries to a snapshot file, replacing any existing file.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn write_snapshot<P: AsRef<Path>>(
    path: P,
    entries: &[SchemaEntry],
    fingerprint: Option<[u8; 32]>,
) -> Result<(), SnapshotError> {
    let bytes = serialize_snapshot(entries, fingerprint)?;
    fs::write(path.as_ref(), &bytes)?;
    tracing::info!(
        path = %path.as_ref().display(),
        modules = entries.len(),
        bytes = bytes.len(),
        "snapshot written"
    );
    Ok(())
}

/// Read a snapshot file without fingerprint verification.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the snapshot is invalid.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<SchemaEntry>, SnapshotError> {
    let bytes = fs::read(path.as_ref())?;
    let entries = deserialize_snapshot(&bytes, None)?;
    tracing::debug!(path = %path.as_ref().display(), modules = entries.len(), "snapshot read");
    Ok(entries)
}

/// Read a snapshot file, rejecting it unless its fingerprint matches.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the snapshot is invalid,
/// or the fingerprint doesn't match.
pub fn read_snapshot_verified<P: AsRef<Path>>(
    path: P,
    expected_fingerprint: &[u8; 32],
) -> Result<Vec<SchemaEntry>, SnapshotError> {
    let bytes = fs::read(path)?;
    deserialize_snapshot(&bytes, Some(expected_fingerprint))
}

/// Check if a snapshot file exists and has a matching fingerprint.
///
/// Returns `false` if the file doesn't exist, is invalid, carries no
/// fingerprint, or carries a different one.
pub fn is_snapshot_current<P: AsRef<Path>>(path: P, expected_fingerprint: &[u8; 32]) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };

    match get_fingerprint(&bytes) {
        Ok(Some(fp)) => fp == *expected_fingerprint,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miburi_core::model::{Access, ModuleInfo, NodeKind, Oid, SchemaNode, TypeInfo};
    use tempfile::NamedTempFile;

    fn sample_entries() -> Vec<SchemaEntry> {
        let mut info = ModuleInfo::new("IF-MIB");
        info.last_updated = Some("200006140000Z".into());
        let mut entry = SchemaEntry::new(info);
        entry.add_node(SchemaNode::new(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2]), "interfaces", "IF-MIB"));
        entry.add_node(
            SchemaNode::new(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 8]), "ifOperStatus", "IF-MIB")
                .with_kind(NodeKind::Column)
                .with_access(Access::ReadOnly)
                .with_description("The current operational state of the interface.")
                .with_type(TypeInfo::new("INTEGER").with_enum("up", 1).with_enum("down", 2)),
        );
        entry.add_type(TypeInfo::new("InterfaceIndex").with_description("A unique value."));
        vec![entry, SchemaEntry::new(ModuleInfo::new("EMPTY-MIB"))]
    }

    #[test]
    fn test_compute_fingerprint_order_independent() {
        let files1: &[(&str, &[u8])] = &[("a.json", b"content a"), ("b.json", b"content b")];
        let files2: &[(&str, &[u8])] = &[("b.json", b"content b"), ("a.json", b"content a")];

        assert_eq!(compute_fingerprint(files1), compute_fingerprint(files2));
    }

    #[test]
    fn test_compute_fingerprint_content_sensitive() {
        let files1: &[(&str, &[u8])] = &[("a.json", b"content a")];
        let files2: &[(&str, &[u8])] = &[("a.json", b"content b")];
        assert_ne!(compute_fingerprint(files1), compute_fingerprint(files2));

        // name/content boundary is not ambiguous
        let files3: &[(&str, &[u8])] = &[("ab", b"c")];
        let files4: &[(&str, &[u8])] = &[("a", b"bc")];
        assert_ne!(compute_fingerprint(files3), compute_fingerprint(files4));
    }

    #[test]
    fn test_round_trip_no_fingerprint() {
        let entries = sample_entries();
        let bytes = serialize_snapshot(&entries, None).unwrap();
        assert!(bytes.len() > BASE_HEADER_LEN);

        let restored = deserialize_snapshot(&bytes, None).unwrap();
        assert_eq!(restored, entries);
        assert!(restored[0].nodes[0].type_info.is_none());
        assert!(restored[0].nodes[1].type_info.is_some());
    }

    #[test]
    fn test_round_trip_with_fingerprint() {
        let entries = sample_entries();
        let fp = [42u8; 32];
        let bytes = serialize_snapshot(&entries, Some(fp)).unwrap();

        assert_eq!(get_fingerprint(&bytes).unwrap(), Some(fp));
        assert_eq!(deserialize_snapshot(&bytes, Some(&fp)).unwrap(), entries);
        // verification is optional
        assert_eq!(deserialize_snapshot(&bytes, None).unwrap(), entries);
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let entries = sample_entries();
        let bytes = serialize_snapshot(&entries, Some([42u8; 32])).unwrap();
        let result = deserialize_snapshot(&bytes, Some(&[0u8; 32]));
        assert!(matches!(result, Err(SnapshotError::FingerprintMismatch)));

        let bytes = serialize_snapshot(&entries, None).unwrap();
        let result = deserialize_snapshot(&bytes, Some(&[0u8; 32]));
        assert!(matches!(result, Err(SnapshotError::FingerprintMismatch)));
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = serialize_snapshot(&sample_entries(), None).unwrap();
        bytes[4..8].copy_from_slice(&(SNAPSHOT_VERSION + 1).to_le_bytes());

        let err = deserialize_snapshot(&bytes, None).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::VersionMismatch { expected, found }
                if expected == SNAPSHOT_VERSION && found == SNAPSHOT_VERSION + 1
        ));
        assert!(err.to_string().contains("regenerate"));
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            deserialize_snapshot(b"MIB", None),
            Err(SnapshotError::TruncatedHeader)
        ));
        assert!(matches!(
            deserialize_snapshot(b"WMIB\x01\x00\x00\x00\x00", None),
            Err(SnapshotError::InvalidMagic)
        ));

        let bytes = serialize_snapshot(&sample_entries(), Some([7u8; 32])).unwrap();
        assert!(matches!(
            deserialize_snapshot(&bytes[..20], None),
            Err(SnapshotError::TruncatedHeader)
        ));
    }

    #[test]
    fn test_corrupt_payload() {
        let mut bytes = serialize_snapshot(&sample_entries(), None).unwrap();
        bytes.truncate(BASE_HEADER_LEN + 3);

        let err = deserialize_snapshot(&bytes, None).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let entries = sample_entries();
        let fp = [42u8; 32];

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_owned();

        write_snapshot(&path, &entries, Some(fp)).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), entries);
        assert_eq!(read_snapshot_verified(&path, &fp).unwrap(), entries);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_snapshot("/nonexistent/miburi.snap").unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }

    #[test]
    fn test_is_snapshot_current() {
        let fp = [42u8; 32];
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_owned();

        write_snapshot(&path, &sample_entries(), Some(fp)).unwrap();
        assert!(is_snapshot_current(&path, &fp));
        assert!(!is_snapshot_current(&path, &[0u8; 32]));
        assert!(!is_snapshot_current("/nonexistent/miburi.snap", &fp));

        write_snapshot(&path, &sample_entries(), None).unwrap();
        assert!(!is_snapshot_current(&path, &fp));
    }
}
