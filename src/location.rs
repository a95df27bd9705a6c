//! Cachable source locations.
//!
//! Every piece of extracted metadata carries a [`SrcSpan`]: the file it
//! came from plus start/end line and column. Equality, ordering, and
//! hashing are purely structural, so two extractions of the same source
//! fragment compare equal no matter when or where they were allocated.
//! That property is what lets the caching layer decide "this declaration
//! is unchanged" without holding on to syntax trees.
//!
//! Line numbers are 1-based and columns 0-based, as reported by
//! `proc-macro2` with the `span-locations` feature enabled.

use proc_macro2::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use syn::spanned::Spanned;

/// A value-comparable source region.
///
/// The derived `Ord` (file path, then start position, then end position)
/// doubles as the declaration-encounter order used for ordinal assignment
/// and deterministic output: it depends only on where a declaration sits
/// in the project, never on traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SrcSpan {
    /// Path of the source file, as scanned.
    pub file: PathBuf,
    /// 1-based line of the first token.
    pub start_line: usize,
    /// 0-based column of the first token.
    pub start_col: usize,
    /// 1-based line just past the last token.
    pub end_line: usize,
    /// 0-based column just past the last token.
    pub end_col: usize,
}

impl SrcSpan {
    /// Builds a span for a syntax node parsed out of `file`.
    pub fn of<T: Spanned>(file: &Path, node: &T) -> Self {
        Self::from_span(file, node.span())
    }

    /// Builds a span from a raw `proc-macro2` span.
    pub fn from_span(file: &Path, span: Span) -> Self {
        let start = span.start();
        let end = span.end();
        Self {
            file: file.to_path_buf(),
            start_line: start.line,
            start_col: start.column,
            end_line: end.line,
            end_col: end.column,
        }
    }

    /// A zero-width span pointing at the top of a file. Used when a
    /// declaration-level fact has no better anchor.
    pub fn file_start(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            start_line: 1,
            start_col: 0,
            end_line: 1,
            end_col: 0,
        }
    }
}

impl fmt::Display for SrcSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Columns are stored 0-based; display them 1-based as editors do.
        write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.start_line,
            self.start_col + 1
        )
    }
}
