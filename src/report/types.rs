use crate::diff::ParseError;
use crate::review::{Rejection, ValidatedComment};

/// Overall state of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every annotation was accepted
    Clean,
    /// Some annotations were accepted, some rejected
    Partial,
    /// Nothing can be posted
    Empty,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Clean => write!(f, "CLEAN"),
            Status::Partial => write!(f, "PARTIAL"),
            Status::Empty => write!(f, "EMPTY"),
        }
    }
}

/// Everything the caller needs to explain a validation run.
#[derive(Debug)]
pub struct Report {
    /// Files in the diff
    pub files: usize,
    /// Hunks across all files
    pub hunks: usize,
    /// Hunk headers that were skipped as malformed
    pub parse_errors: Vec<ParseError>,
    pub accepted: Vec<ValidatedComment>,
    pub rejected: Vec<Rejection>,
    pub status: Status,
}
