use std::collections::HashMap;

use super::ParseError;

/// Kind of a commentable line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Added,
    Context,
}

/// One new-file line recorded inside a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLine {
    /// Line number in the new version of the file
    pub number: usize,
    pub kind: LineKind,
    /// Line content without its diff prefix
    pub text: String,
}

/// A contiguous region of changes within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Starting line number in the old file
    pub old_start: usize,
    /// Number of lines in the old file
    pub old_count: usize,
    /// Starting line number in the new file
    pub new_start: usize,
    /// Number of lines in the new file, as declared by the header
    pub new_count: usize,
    /// Added and context lines, numbered contiguously from `new_start`
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    pub fn new(old_start: usize, old_count: usize, new_start: usize, new_count: usize) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// Last commentable new-file line, or `None` for an empty hunk.
    pub fn last_line(&self) -> Option<usize> {
        self.lines.last().map(|l| l.number)
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().map(|l| l.number)
    }

    /// True when every line in `start..=end` is a line of this hunk.
    ///
    /// Lines are numbered without gaps, so the first and last bound the set.
    pub fn covers(&self, start: usize, end: usize) -> bool {
        match (self.lines.first(), self.lines.last()) {
            (Some(first), Some(last)) => first.number <= start && start <= end && end <= last.number,
            _ => false,
        }
    }
}

/// A single file within the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Normalized path (diff prefix such as `b/` already stripped)
    pub path: String,
    /// Whether this is a new file (`--- /dev/null`)
    pub is_new: bool,
    /// Whether this file was deleted (`+++ /dev/null`)
    pub is_deleted: bool,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn new(path: String) -> Self {
        Self {
            path,
            is_new: false,
            is_deleted: false,
            additions: 0,
            deletions: 0,
            hunks: Vec::new(),
        }
    }
}

/// Every file touched by a diff, in the order they first appear.
///
/// Built once from the raw diff text and never mutated afterwards, so it can
/// be shared by reference between any number of validators.
#[derive(Debug, Clone, Default)]
pub struct DiffDocument {
    files: Vec<FileDiff>,
    by_path: HashMap<String, usize>,
    parse_errors: Vec<ParseError>,
}

impl DiffDocument {
    pub(super) fn from_parts(files: Vec<FileDiff>, parse_errors: Vec<ParseError>) -> Self {
        let mut merged: Vec<FileDiff> = Vec::with_capacity(files.len());
        let mut by_path = HashMap::new();
        for file in files {
            match by_path.get(&file.path).copied() {
                Some(idx) => {
                    let existing: &mut FileDiff = &mut merged[idx];
                    existing.is_new |= file.is_new;
                    existing.is_deleted |= file.is_deleted;
                    existing.additions += file.additions;
                    existing.deletions += file.deletions;
                    existing.hunks.extend(file.hunks);
                }
                None => {
                    by_path.insert(file.path.clone(), merged.len());
                    merged.push(file);
                }
            }
        }
        Self {
            files: merged,
            by_path,
            parse_errors,
        }
    }

    pub fn files(&self) -> &[FileDiff] {
        &self.files
    }

    /// Look up a file by path. The path is normalized before the lookup.
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        let key = super::normalize_path(path);
        self.by_path.get(key).map(|&idx| &self.files[idx])
    }

    /// Malformed hunk headers that were skipped while building the document.
    pub fn parse_errors(&self) -> &[ParseError] {
        &self.parse_errors
    }

    pub fn hunk_count(&self) -> usize {
        self.files.iter().map(|f| f.hunks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
