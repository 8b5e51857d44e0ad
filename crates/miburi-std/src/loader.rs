//! Filesystem schema loading.
//!
//! Every regular file in a scanned directory is a module definition: JSON
//! holding one [`SchemaEntry`] or an array of them (the shape `miburi json`
//! prints). A file that cannot be read or parsed is logged and skipped; the
//! rest of the batch still loads.

use miburi_core::SchemaEntry;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory could not be scanned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The directory could not be read.
    #[error("cannot read schema directory {path}: {source}")]
    Io {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The path exists but is not a directory.
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// A file that was skipped during loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path of the file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of loading a set of directories.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    /// Loaded entries, in directory then file-name order.
    pub entries: Vec<SchemaEntry>,
    /// Files that failed to load.
    pub skipped: Vec<SkippedFile>,
    /// `(name, content)` of every file that loaded, for fingerprinting. The
    /// name is relative to the scanned directory with `/` separators, so a
    /// moved directory keeps its fingerprint.
    pub sources: Vec<(String, Vec<u8>)>,
}

impl LoadReport {
    /// Check if nothing was skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Total nodes across all loaded entries.
    #[must_use]
    pub fn node_count(&self) -> usize {
        miburi_core::model::total_nodes(&self.entries)
    }
}

/// Source of schema entries.
pub trait SchemaLoader {
    /// Load every module found under `dirs`.
    ///
    /// # Errors
    ///
    /// Returns an error only when a directory itself cannot be scanned.
    /// Individual module failures are reported in [`LoadReport::skipped`].
    fn load_all(&mut self, dirs: &[PathBuf]) -> Result<LoadReport, LoadError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleFile {
    One(SchemaEntry),
    Many(Vec<SchemaEntry>),
}

/// Loads module files from directories (non-recursive).
#[derive(Clone, Debug, Default)]
pub struct DirectoryLoader {
    recursive: bool,
}

impl DirectoryLoader {
    /// Create a loader that scans only the top level of each directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also descend into subdirectories.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn load_dir(&self, dir: &Path, report: &mut LoadReport) -> Result<(), LoadError> {
        let meta = fs::metadata(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(LoadError::NotADirectory(dir.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    skip(report, path, err.to_string());
                    continue;
                }
            };
            if entry.file_type().is_file() {
                load_file(dir, entry.path(), report);
            }
        }
        Ok(())
    }
}

impl SchemaLoader for DirectoryLoader {
    fn load_all(&mut self, dirs: &[PathBuf]) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();
        for dir in dirs {
            self.load_dir(dir, &mut report)?;
        }
        tracing::info!(
            modules = report.entries.len(),
            nodes = report.node_count(),
            skipped = report.skipped.len(),
            "schema modules loaded"
        );
        Ok(report)
    }
}

fn skip(report: &mut LoadReport, path: PathBuf, reason: String) {
    tracing::warn!(path = %path.display(), %reason, "skipping schema module");
    report.skipped.push(SkippedFile { path, reason });
}

fn source_name(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn load_file(dir: &Path, path: &Path, report: &mut LoadReport) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return skip(report, path.to_path_buf(), err.to_string()),
    };
    let parsed = match serde_json::from_slice::<ModuleFile>(&bytes) {
        Ok(parsed) => parsed,
        Err(err) => return skip(report, path.to_path_buf(), err.to_string()),
    };

    let mut entries = match parsed {
        ModuleFile::One(entry) => vec![entry],
        ModuleFile::Many(entries) => entries,
    };
    let display_path = path.display().to_string();
    for entry in &mut entries {
        if entry.module.path.is_none() {
            entry.module.path = Some(display_path.clone());
        }
        tracing::debug!(module = entry.name(), nodes = entry.node_count(), path = %display_path, "module loaded");
    }
    report.entries.extend(entries);
    report.sources.push((source_name(dir, path), bytes));
}
