//! Line classification for unified diff text.
//!
//! The lexer yields exactly one [`DiffLine`] per physical input line, so the
//! position of an item in the stream is its (0-based) line index.

use super::normalize_path;

const FILE_MARKER: &str = "diff --git ";
const HUNK_MARKER: &str = "@@";

/// One classified line of diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// Start of a file section, carrying the normalized target path
    FileMarker(String),
    /// Raw hunk header line, e.g. `@@ -10,3 +10,4 @@ fn main`
    HunkHeader(&'a str),
    Added(&'a str),
    Context(&'a str),
    Removed(&'a str),
    /// Header block lines (`index`, `---`, `+++`, mode lines), `\ No newline`
    /// markers, and anything else that is not hunk content
    Other(&'a str),
}

/// Lazy iterator over the classified lines of a diff.
///
/// A clone resumes from the same position; call [`lex`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    lines: std::str::Lines<'a>,
    // True between a file marker (or the start of input) and the first hunk
    // header of that section. `---`/`+++` summary lines only occur here.
    in_header: bool,
}

/// Start lexing `raw_diff` from its first line.
pub fn lex(raw_diff: &str) -> Lexer<'_> {
    Lexer {
        lines: raw_diff.lines(),
        in_header: true,
    }
}

impl<'a> Lexer<'a> {
    fn classify(&mut self, line: &'a str) -> DiffLine<'a> {
        if let Some(rest) = line.strip_prefix(FILE_MARKER) {
            self.in_header = true;
            return match target_path(rest) {
                Some(path) => DiffLine::FileMarker(path),
                None => DiffLine::Other(line),
            };
        }

        if line.starts_with(HUNK_MARKER) {
            self.in_header = false;
            return DiffLine::HunkHeader(line);
        }

        if self.in_header {
            return DiffLine::Other(line);
        }

        match line.as_bytes().first() {
            Some(b'+') => DiffLine::Added(&line[1..]),
            Some(b'-') => DiffLine::Removed(&line[1..]),
            Some(b' ') => DiffLine::Context(&line[1..]),
            _ => DiffLine::Other(line),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = DiffLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(self.classify(line))
    }
}

/// Extract the target (new-side) path from the remainder of a
/// `diff --git a/<path> b/<path>` line.
///
/// Paths may contain spaces, so the split is on the ` b/` separator rather
/// than on whitespace. The `+++` summary line, when present, overrides this.
fn target_path(rest: &str) -> Option<String> {
    let rest = rest.trim();
    let path = match same_path_split(rest).or_else(|| rest.find(" b/").map(|idx| idx + 1)) {
        Some(idx) => &rest[idx..],
        None => rest.split_whitespace().last()?,
    };
    let path = normalize_path(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Start of the `b/` half when the marker is `a/<p> b/<p>` for one path `<p>`.
fn same_path_split(rest: &str) -> Option<usize> {
    if rest.len() % 2 == 0 {
        return None;
    }
    let mid = rest.len() / 2;
    let (old, new) = (rest.get(..mid)?, rest.get(mid + 1..)?);
    match (old.strip_prefix("a/"), new.strip_prefix("b/")) {
        (Some(a), Some(b)) if a == b && rest.as_bytes()[mid] == b' ' => Some(mid + 1),
        _ => None,
    }
}
