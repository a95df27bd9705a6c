//! End-to-end analysis pipeline.
//!
//! One run: scan the project root, extract each file (reusing cached
//! extractions by content fingerprint), then resolve and synthesize over
//! the whole unit. Per-file extraction is a pure function of the file's
//! own text, so a host may scatter it across workers; resolution only
//! starts once every file is in, because group and validator lookup need
//! global visibility. The bundled driver runs the scatter sequentially.
//!
//! Every stage checks the [`CancelToken`] at least once per file or
//! declaration. A cancelled run returns [`Error::Cancelled`] without
//! touching the run memo, so no partial output is ever observable.
//!
//! [`Error::Cancelled`]: crate::error::Error::Cancelled

use crate::cache::ExtractionCache;
use crate::cancel::CancelToken;
use crate::codegen::{CodeSynthesizer, GeneratedUnit};
use crate::error::Result;
use crate::extractor::{FileExtraction, MetadataExtractor};
use crate::parser::AstParser;
use crate::resolver::{ResolvedUnit, Resolver};
use crate::scanner::SourceScanner;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reuse accounting for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Rust files the scanner found.
    pub files_scanned: usize,
    /// Files served from the extraction cache.
    pub files_reused: usize,
    /// Whether resolution and synthesis were skipped wholesale.
    pub run_reused: bool,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub resolved: Arc<ResolvedUnit>,
    pub generated: Arc<GeneratedUnit>,
    pub stats: RunStats,
}

/// The pipeline, holding the cache that persists across runs.
pub struct Pipeline {
    cache: Arc<ExtractionCache>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(ExtractionCache::new()),
        }
    }

    /// Builds a pipeline around an externally owned cache, letting a
    /// host share one store across pipelines.
    pub fn with_cache(cache: Arc<ExtractionCache>) -> Self {
        Self { cache }
    }

    /// Scans `root` and analyzes everything under it.
    pub fn run(&self, root: &Path, cancel: &CancelToken) -> Result<RunOutput> {
        let scan = SourceScanner::new(root.to_path_buf()).scan()?;
        info!(
            "Scanning {}: {} Rust file(s)",
            root.display(),
            scan.files.len()
        );
        for warning in &scan.warnings {
            warn!("{}", warning);
        }

        let mut sources = Vec::with_capacity(scan.files.len());
        for path in scan.files {
            cancel.checkpoint()?;
            match fs::read_to_string(&path) {
                Ok(content) => sources.push((path, content)),
                Err(e) => warn!("Skipping unreadable file {}: {}", path.display(), e),
            }
        }

        self.run_sources(sources, cancel)
    }

    /// Analyzes already-loaded sources. This is the whole pipeline minus
    /// disk I/O; `run` delegates here after reading files.
    pub fn run_sources(
        &self,
        sources: Vec<(PathBuf, String)>,
        cancel: &CancelToken,
    ) -> Result<RunOutput> {
        let files_scanned = sources.len();
        let mut files_reused = 0usize;
        let mut extractions: Vec<Arc<FileExtraction>> = Vec::with_capacity(files_scanned);
        let mut live: HashSet<PathBuf> = HashSet::with_capacity(files_scanned);

        for (path, content) in &sources {
            cancel.checkpoint()?;
            live.insert(path.clone());

            let fingerprint = ExtractionCache::fingerprint(content);
            if let Some(hit) = self.cache.lookup_file(path, fingerprint) {
                files_reused += 1;
                extractions.push(hit);
                continue;
            }

            // A file mid-edit may not parse; the rest of the unit still
            // gets analyzed.
            let parsed = match AstParser::parse_source(path, content) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let extraction = MetadataExtractor::extract_file(&parsed);
            extractions.push(self.cache.store_file(fingerprint, extraction));
        }
        self.cache.retain_files(&live);

        debug!(
            "Extraction complete: {} file(s), {} from cache",
            files_scanned, files_reused
        );

        cancel.checkpoint()?;
        if let Some((resolved, generated)) = self.cache.lookup_run(&extractions) {
            info!("Extractions unchanged; reusing previous run's output");
            return Ok(RunOutput {
                resolved,
                generated,
                stats: RunStats {
                    files_scanned,
                    files_reused,
                    run_reused: true,
                },
            });
        }

        let resolved = Arc::new(Resolver::resolve(&extractions, cancel)?);
        let generated = Arc::new(CodeSynthesizer::synthesize(&resolved, cancel)?);
        info!(
            "Resolved {} endpoint(s), {} group(s) with {} diagnostic(s)",
            resolved.endpoints.len(),
            resolved.groups.len(),
            resolved.diagnostics.len()
        );

        self.cache
            .store_run(extractions, Arc::clone(&resolved), Arc::clone(&generated));

        Ok(RunOutput {
            resolved,
            generated,
            stats: RunStats {
                files_scanned,
                files_reused,
                run_reused: false,
            },
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
