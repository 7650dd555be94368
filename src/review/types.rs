use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An unvalidated candidate comment proposed by an external reviewer.
///
/// Line numbers are signed so that nonsense input (zero, negatives) survives
/// loading and is rejected by the validator with a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAnnotation")]
pub struct Annotation {
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub body: String,
}

/// Wire shape accepted for annotations. Single-line records may use `line`
/// (or `position`) instead of a start/end pair.
#[derive(Debug, Deserialize)]
struct RawAnnotation {
    #[serde(default)]
    path: String,
    #[serde(default, alias = "startLine", deserialize_with = "lenient_line")]
    start_line: Option<i64>,
    #[serde(default, alias = "endLine", deserialize_with = "lenient_line")]
    end_line: Option<i64>,
    #[serde(default, alias = "position", deserialize_with = "lenient_line")]
    line: Option<i64>,
    #[serde(default)]
    body: String,
}

/// Accept integers and numeric strings. `null` counts as absent; any other
/// value becomes `0` so the validator rejects it as a malformed range.
fn lenient_line<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => Some(n.as_i64().unwrap_or(0)),
        serde_json::Value::String(s) => Some(s.trim().parse().unwrap_or(0)),
        _ => Some(0),
    })
}

impl From<RawAnnotation> for Annotation {
    fn from(raw: RawAnnotation) -> Self {
        let start_line = raw.start_line.or(raw.line).unwrap_or(0);
        let end_line = raw.end_line.or(raw.line).unwrap_or(start_line);
        Annotation {
            path: raw.path,
            start_line,
            end_line,
            body: raw.body,
        }
    }
}

/// Which side of the diff a comment is anchored to. Only new-file lines are
/// commentable, so this is always `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Right,
}

/// An annotation that passed validation and may be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedComment {
    /// Normalized path, as it appears in the diff document
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub body: String,
    pub side: Side,
}

/// How a comment range may relate to the hunks of its file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossHunkPolicy {
    /// The whole range must lie inside one hunk
    #[default]
    Strict,
    /// The range may span hunks as long as every line is commentable
    /// somewhere in the file
    FileUnion,
}

/// Why an annotation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("file {path:?} is not part of the diff")]
    UnknownFile { path: String },

    #[error("line range {start}..{end} must use positive line numbers")]
    MalformedRange { start: i64, end: i64 },

    #[error("line range is inverted: start {start} is after end {end}")]
    InvertedRange { start: i64, end: i64 },

    #[error("lines {start}..{end} of {path:?} are not inside a single diff hunk")]
    OutOfHunkRange { path: String, start: usize, end: usize },
}

impl RejectionReason {
    /// Short stable label, e.g. for grouping in reports.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::UnknownFile { .. } => "UnknownFile",
            RejectionReason::MalformedRange { .. } => "MalformedRange",
            RejectionReason::InvertedRange { .. } => "InvertedRange",
            RejectionReason::OutOfHunkRange { .. } => "OutOfHunkRange",
        }
    }
}

/// An annotation paired with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub annotation: Annotation,
    pub reason: RejectionReason,
}

/// Result of validating a batch of annotations, in input order.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ValidatedComment>,
    pub rejected: Vec<Rejection>,
}
