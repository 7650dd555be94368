use std::collections::{BTreeSet, HashMap};

use crate::diff::{normalize_path, DiffDocument};

#[derive(Debug, Clone, Default)]
struct FileLines {
    hunks: Vec<BTreeSet<usize>>,
    union: BTreeSet<usize>,
}

/// New-file line numbers that may receive a comment, per file and per hunk.
///
/// Computed eagerly from an immutable [`DiffDocument`]; lookups take any
/// path form accepted by [`normalize_path`].
#[derive(Debug, Clone, Default)]
pub struct CommentableIndex {
    files: HashMap<String, FileLines>,
}

impl CommentableIndex {
    pub fn new(document: &DiffDocument) -> Self {
        let files = document
            .files()
            .iter()
            .map(|file| {
                let hunks: Vec<BTreeSet<usize>> = file
                    .hunks
                    .iter()
                    .map(|hunk| hunk.line_numbers().collect())
                    .collect();
                let union = hunks.iter().flatten().copied().collect();
                (file.path.clone(), FileLines { hunks, union })
            })
            .collect();
        Self { files }
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(normalize_path(path))
    }

    /// Commentable lines of each hunk of `path`, in hunk order.
    pub fn hunks(&self, path: &str) -> Option<&[BTreeSet<usize>]> {
        self.files
            .get(normalize_path(path))
            .map(|f| f.hunks.as_slice())
    }

    /// Commentable lines of hunk number `hunk` (0-based) of `path`.
    pub fn hunk_lines(&self, path: &str, hunk: usize) -> Option<&BTreeSet<usize>> {
        self.hunks(path).and_then(|hunks| hunks.get(hunk))
    }

    /// Union of commentable lines across every hunk of `path`.
    pub fn file_lines(&self, path: &str) -> Option<&BTreeSet<usize>> {
        self.files.get(normalize_path(path)).map(|f| &f.union)
    }
}

/// True when every line in `start..=end` is present in `lines`.
pub(crate) fn covers(lines: &BTreeSet<usize>, start: usize, end: usize) -> bool {
    if start > end {
        return false;
    }
    let Some(wanted) = (end - start).checked_add(1) else {
        return false;
    };
    // bounded by the set size, not by the requested range
    wanted <= lines.len() && lines.range(start..=end).count() == wanted
}
