use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST parser for Rust source files.
///
/// Thin wrapper over `syn::parse_file` producing [`ParsedFile`]s. Parsing
/// is split from file reading so the incremental layer can fingerprint
/// file text first and only pay for a parse on cache misses.
pub struct AstParser;

/// A successfully parsed Rust file with its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file.
    pub path: PathBuf,
    /// The parsed abstract syntax tree.
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Reads and parses a single Rust source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain
    /// valid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_source(path, &content)
    }

    /// Parses already-read source text attributed to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let syntax_tree = syn::parse_file(content).map_err(|e| Error::Parse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple files, continuing past failures.
    ///
    /// Files that fail to parse are logged and returned as `Err` entries;
    /// analysis proceeds over whatever parsed. A project mid-edit should
    /// still produce diagnostics for its intact files.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        debug!("Parsing complete: {} succeeded, {} failed", ok, results.len() - ok);

        results
    }
}
