//! Builds the single batched review submission from validated comments.
//!
//! The payload follows the pull-request review shape used by GitHub
//! (`body`, `event`, `commit_id`, `comments[]`). Posting it is up to the
//! caller.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::config::ReviewConfig;
use crate::review::{Side, ValidatedComment};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize review payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write review payload: {0}")]
    Write(#[from] std::io::Error),
}

/// One line-anchored comment in the review payload.
///
/// Single-line comments carry only `line`; ranges add `start_line` and
/// `start_side`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    pub path: String,
    pub body: String,
    pub line: usize,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<Side>,
}

impl From<&ValidatedComment> for ReviewComment {
    fn from(comment: &ValidatedComment) -> Self {
        let multi_line = comment.start_line < comment.end_line;
        ReviewComment {
            path: comment.path.clone(),
            body: comment.body.clone(),
            line: comment.end_line,
            side: comment.side,
            start_line: multi_line.then_some(comment.start_line),
            start_side: multi_line.then_some(comment.side),
        }
    }
}

/// The whole review, submitted in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    pub body: String,
    pub event: String,
    pub comments: Vec<ReviewComment>,
}

impl ReviewPayload {
    pub fn new(config: &ReviewConfig, comments: &[ValidatedComment]) -> Self {
        Self {
            commit_id: config.commit_id.clone(),
            body: config.body.clone(),
            event: config.event.clone(),
            comments: comments.iter().map(ReviewComment::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the payload as pretty JSON to `path`, or to stdout when `None`.
#[instrument(skip(payload), fields(comments = payload.comments.len()))]
pub async fn write_payload(payload: &ReviewPayload, path: Option<&Path>) -> Result<(), PublishError> {
    let mut json = payload.to_json()?;
    json.push('\n');
    match path {
        Some(path) => {
            debug!(path = %path.display(), "writing review payload to file");
            tokio::fs::write(path, json).await?;
        }
        None => {
            debug!("writing review payload to stdout");
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
