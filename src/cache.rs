//! Incremental extraction cache.
//!
//! Two levels of reuse, both driven by value equality:
//!
//! 1. Per file: the extraction of a file is a pure function of its text,
//!    so a content fingerprint decides whether the stored
//!    [`FileExtraction`] is still good. Unchanged files skip parsing and
//!    extraction entirely.
//! 2. Per run: when the full extraction sequence comes out identical to
//!    the previous run's, resolution, naming, and synthesis are skipped
//!    and the stored outputs are returned. Ordinals stay stable because
//!    they derive from the declaration total order, not from which files
//!    happened to be re-extracted.
//!
//! The store tolerates concurrent readers with exclusive writers, which
//! is all the host's scheduling needs.

use crate::codegen::GeneratedUnit;
use crate::extractor::FileExtraction;
use crate::resolver::ResolvedUnit;
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

struct FileEntry {
    fingerprint: u64,
    extraction: Arc<FileExtraction>,
}

struct RunEntry {
    extractions: Vec<Arc<FileExtraction>>,
    resolved: Arc<ResolvedUnit>,
    generated: Arc<GeneratedUnit>,
}

/// Cache shared across invocations of the pipeline.
#[derive(Default)]
pub struct ExtractionCache {
    files: RwLock<HashMap<PathBuf, FileEntry>>,
    last_run: RwLock<Option<RunEntry>>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content fingerprint used as the per-file cache key.
    pub fn fingerprint(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns the stored extraction when the file's content fingerprint
    /// still matches.
    pub fn lookup_file(&self, path: &Path, fingerprint: u64) -> Option<Arc<FileExtraction>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(path)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| Arc::clone(&entry.extraction))
    }

    /// Stores a freshly computed extraction under its file's fingerprint
    /// and hands back the shared copy.
    pub fn store_file(&self, fingerprint: u64, extraction: FileExtraction) -> Arc<FileExtraction> {
        let path = extraction.file.clone();
        let extraction = Arc::new(extraction);
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(
            path,
            FileEntry {
                fingerprint,
                extraction: Arc::clone(&extraction),
            },
        );
        extraction
    }

    /// Drops entries for files that left the scan set.
    pub fn retain_files(&self, live: &HashSet<PathBuf>) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        let before = files.len();
        files.retain(|path, _| live.contains(path));
        let dropped = before - files.len();
        if dropped > 0 {
            debug!("Evicted {} cached file(s) no longer on disk", dropped);
        }
    }

    /// Returns the previous run's outputs when the extraction sequence
    /// is unchanged. Unchanged files share their `Arc`s across runs, so
    /// the comparison is usually pointer equality; value equality covers
    /// re-extracted files that came out identical.
    pub fn lookup_run(
        &self,
        extractions: &[Arc<FileExtraction>],
    ) -> Option<(Arc<ResolvedUnit>, Arc<GeneratedUnit>)> {
        let last_run = self.last_run.read().unwrap_or_else(|e| e.into_inner());
        let entry = last_run.as_ref()?;
        if entry.extractions.len() != extractions.len() {
            return None;
        }
        let unchanged = entry
            .extractions
            .iter()
            .zip(extractions)
            .all(|(old, new)| Arc::ptr_eq(old, new) || old == new);
        if unchanged {
            Some((Arc::clone(&entry.resolved), Arc::clone(&entry.generated)))
        } else {
            None
        }
    }

    /// Records a completed run for the next invocation to compare
    /// against.
    pub fn store_run(
        &self,
        extractions: Vec<Arc<FileExtraction>>,
        resolved: Arc<ResolvedUnit>,
        generated: Arc<GeneratedUnit>,
    ) {
        let mut last_run = self.last_run.write().unwrap_or_else(|e| e.into_inner());
        *last_run = Some(RunEntry {
            extractions,
            resolved,
            generated,
        });
    }

    pub fn clear(&self) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        *self.last_run.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Number of cached file extractions.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
