pub mod builder;
pub mod lexer;
pub mod types;

pub use types::{DiffDocument, FileDiff, Hunk, HunkLine, LineKind};

use thiserror::Error;
use tracing::{debug, instrument};

/// A hunk header that could not be parsed.
///
/// Recovered locally: the builder drops the hunk and skips content lines
/// until the next file marker or valid hunk header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed hunk header at diff line {line_no}: {reason} ({header:?})")]
pub struct ParseError {
    /// 1-based line number within the raw diff text
    pub line_no: usize,
    pub header: String,
    pub reason: String,
}

/// Strip a single diff-marker prefix (`a/` or `b/`) from a path.
///
/// Used for both diff paths and annotation paths so the two always compare
/// in the same form.
pub fn normalize_path(path: &str) -> &str {
    let path = path.trim();
    path.strip_prefix("b/")
        .or_else(|| path.strip_prefix("a/"))
        .unwrap_or(path)
}

/// Parse raw unified diff text into a [`DiffDocument`].
///
/// Never fails: malformed hunk headers are recorded in
/// [`DiffDocument::parse_errors`] and the rest of the document is kept.
#[instrument(skip(raw_diff), fields(diff_bytes = raw_diff.len()))]
pub fn parse_document(raw_diff: &str) -> DiffDocument {
    let document = builder::build(lexer::lex(raw_diff));
    debug!(
        files = document.files().len(),
        hunks = document.hunk_count(),
        parse_errors = document.parse_errors().len(),
        "parsed diff"
    );
    document
}
