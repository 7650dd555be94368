//! Folds the lexed line stream into a [`DiffDocument`].
//!
//! Parser state lives in an explicit accumulator threaded through each line:
//! `AwaitingFile -> InFile -> InHunk`. Only a file marker leaves a file; a
//! malformed hunk header drops back to `InFile` with no cursor.

use tracing::warn;

use super::lexer::DiffLine;
use super::types::{DiffDocument, FileDiff, Hunk, HunkLine, LineKind};
use super::{normalize_path, ParseError};

/// New/old ranges parsed from a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

enum State {
    AwaitingFile,
    InFile(FileDiff),
    InHunk {
        file: FileDiff,
        hunk: Hunk,
        /// Next new-file line number to assign
        cursor: usize,
    },
}

struct Fold {
    files: Vec<FileDiff>,
    errors: Vec<ParseError>,
    state: State,
}

/// Build a document from a lexed line stream.
///
/// Items are numbered by position, so the stream must contain one item per
/// physical diff line (which is what [`super::lexer::lex`] produces).
pub fn build<'a, I>(lines: I) -> DiffDocument
where
    I: IntoIterator<Item = DiffLine<'a>>,
{
    lines
        .into_iter()
        .enumerate()
        .fold(Fold::new(), |acc, (idx, line)| acc.step(idx + 1, line))
        .finish()
}

impl Fold {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            errors: Vec::new(),
            state: State::AwaitingFile,
        }
    }

    fn step(mut self, line_no: usize, line: DiffLine<'_>) -> Self {
        let state = std::mem::replace(&mut self.state, State::AwaitingFile);
        self.state = match (state, line) {
            (state, DiffLine::FileMarker(path)) => {
                self.close_file(state);
                State::InFile(FileDiff::new(path))
            }
            (State::AwaitingFile, _) => State::AwaitingFile,
            (State::InFile(file), DiffLine::HunkHeader(raw)) => self.open_hunk(file, line_no, raw),
            (State::InHunk { mut file, hunk, .. }, DiffLine::HunkHeader(raw)) => {
                file.hunks.push(hunk);
                self.open_hunk(file, line_no, raw)
            }
            (State::InFile(mut file), DiffLine::Other(raw)) => {
                match raw.trim_end() {
                    "--- /dev/null" => file.is_new = true,
                    "+++ /dev/null" => file.is_deleted = true,
                    // The `+++` line names the target unambiguously, even when
                    // the path contains spaces.
                    summary => {
                        if let Some(path) = summary.strip_prefix("+++ ").and_then(summary_path) {
                            file.path = path;
                        }
                    }
                }
                State::InFile(file)
            }
            (State::InHunk { mut file, mut hunk, cursor }, DiffLine::Added(text)) => {
                file.additions += 1;
                hunk.lines.push(HunkLine {
                    number: cursor,
                    kind: LineKind::Added,
                    text: text.to_string(),
                });
                advance(file, hunk, cursor)
            }
            (State::InHunk { file, mut hunk, cursor }, DiffLine::Context(text)) => {
                hunk.lines.push(HunkLine {
                    number: cursor,
                    kind: LineKind::Context,
                    text: text.to_string(),
                });
                advance(file, hunk, cursor)
            }
            // Removed lines occupy no new-file line; the cursor stays put.
            (State::InHunk { mut file, hunk, cursor }, DiffLine::Removed(_)) => {
                file.deletions += 1;
                State::InHunk { file, hunk, cursor }
            }
            (state, _) => state,
        };
        self
    }

    fn open_hunk(&mut self, file: FileDiff, line_no: usize, raw: &str) -> State {
        match parse_hunk_header(raw) {
            Ok(range) => State::InHunk {
                file,
                hunk: Hunk::new(range.old_start, range.old_count, range.new_start, range.new_count),
                cursor: range.new_start,
            },
            Err(reason) => {
                warn!(path = %file.path, line_no, header = raw, %reason, "skipping malformed hunk header");
                self.errors.push(ParseError {
                    line_no,
                    header: raw.to_string(),
                    reason,
                });
                State::InFile(file)
            }
        }
    }

    fn close_file(&mut self, state: State) {
        match state {
            State::AwaitingFile => {}
            State::InFile(file) => self.files.push(file),
            State::InHunk { mut file, hunk, .. } => {
                file.hunks.push(hunk);
                self.files.push(file);
            }
        }
    }

    fn finish(mut self) -> DiffDocument {
        let state = std::mem::replace(&mut self.state, State::AwaitingFile);
        self.close_file(state);
        DiffDocument::from_parts(self.files, self.errors)
    }
}

/// Move past a numbered line. A hunk that runs past the last representable
/// line number is closed instead of wrapping.
fn advance(mut file: FileDiff, hunk: Hunk, cursor: usize) -> State {
    match cursor.checked_add(1) {
        Some(next) => State::InHunk { file, hunk, cursor: next },
        None => {
            warn!(path = %file.path, line = cursor, "hunk exceeds line number range, closing it");
            file.hunks.push(hunk);
            State::InFile(file)
        }
    }
}

/// Target path from the text after `+++ `, without any trailing timestamp.
fn summary_path(rest: &str) -> Option<String> {
    let path = rest.split('\t').next().unwrap_or(rest);
    let path = normalize_path(path);
    if path.is_empty() || path == "/dev/null" {
        None
    } else {
        Some(path.to_string())
    }
}

/// Parse `@@ -old_start[,old_count] +new_start[,new_count] @@ [section]`.
pub fn parse_hunk_header(line: &str) -> Result<HunkRange, String> {
    let header = line
        .trim()
        .strip_prefix("@@")
        .ok_or_else(|| "missing @@ marker".to_string())?;
    let mut parts = header.split_whitespace();
    let old_part = parts.next().ok_or_else(|| "missing old range".to_string())?;
    let new_part = parts.next().ok_or_else(|| "missing new range".to_string())?;

    let (old_start, old_count) = parse_range(old_part, '-')?;
    let (new_start, new_count) = parse_range(new_part, '+')?;
    if old_start.checked_add(old_count).is_none() || new_start.checked_add(new_count).is_none() {
        return Err("range exceeds line number limit".to_string());
    }

    Ok(HunkRange {
        old_start,
        old_count,
        new_start,
        new_count,
    })
}

fn parse_range(part: &str, prefix: char) -> Result<(usize, usize), String> {
    let range = part
        .strip_prefix(prefix)
        .ok_or_else(|| format!("range {part:?} does not start with '{prefix}'"))?;
    let (start_str, count_str) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    let start = start_str
        .parse::<usize>()
        .map_err(|_| format!("invalid range start in {part:?}"))?;
    let count = count_str
        .parse::<usize>()
        .map_err(|_| format!("invalid range count in {part:?}"))?;
    Ok((start, count))
}
