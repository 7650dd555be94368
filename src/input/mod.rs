//! Where diff text and candidate annotations come from.
//!
//! Fetching a pull request over the network is left to the caller; this
//! module only reads what has already been fetched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

use crate::review::Annotation;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to parse annotations from {source_name}: {error}")]
    Annotations {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },
}

/// Supplies the raw unified diff for one review run.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> String;

    async fn fetch_diff(&self) -> Result<String, InputError>;
}

/// Reads the diff from a file on disk.
pub struct FileDiffSource {
    path: PathBuf,
}

impl FileDiffSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DiffSource for FileDiffSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_diff(&self) -> Result<String, InputError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| InputError::Read {
                source_name: self.name(),
                error,
            })
    }
}

/// Reads the diff from standard input until EOF.
pub struct StdinDiffSource;

#[async_trait]
impl DiffSource for StdinDiffSource {
    fn name(&self) -> String {
        "<stdin>".to_string()
    }

    async fn fetch_diff(&self) -> Result<String, InputError> {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|error| InputError::Read {
                source_name: self.name(),
                error,
            })?;
        Ok(buf)
    }
}

/// Serves a diff held in memory (demo fixture, tests).
pub struct StaticDiffSource {
    name: String,
    text: String,
}

impl StaticDiffSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl DiffSource for StaticDiffSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn fetch_diff(&self) -> Result<String, InputError> {
        Ok(self.text.clone())
    }
}

/// Pick a diff source from a CLI argument: `-` means stdin.
pub fn diff_source_for(arg: &Path) -> Box<dyn DiffSource> {
    if arg == Path::new("-") {
        Box::new(StdinDiffSource)
    } else {
        Box::new(FileDiffSource::new(arg))
    }
}

/// Fetch and log the diff text from any source.
#[instrument(skip(source), fields(diff_source = %source.name()))]
pub async fn read_diff(source: &dyn DiffSource) -> Result<String, InputError> {
    let text = source.fetch_diff().await?;
    debug!(diff_bytes = text.len(), "read diff");
    Ok(text)
}

/// Parse a JSON array of annotation records.
///
/// Only a document that is not an array fails the load. Each element is
/// decoded on its own; one that is not a usable record is skipped with a
/// warning so the rest of the batch survives.
pub fn parse_annotations(source_name: &str, json: &str) -> Result<Vec<Annotation>, InputError> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|error| InputError::Annotations {
            source_name: source_name.to_string(),
            error,
        })?;

    let annotations = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Annotation>(record) {
            Ok(annotation) => Some(annotation),
            Err(error) => {
                warn!(source_name, index, %error, "skipping unreadable annotation record");
                None
            }
        })
        .collect();
    Ok(annotations)
}

/// Load annotations from a JSON file.
#[instrument(skip(path), fields(path = %path.display()))]
pub async fn load_annotations(path: &Path) -> Result<Vec<Annotation>, InputError> {
    let source_name = path.display().to_string();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|error| InputError::Read {
            source_name: source_name.clone(),
            error,
        })?;
    let annotations = parse_annotations(&source_name, &json)?;
    debug!(count = annotations.len(), "loaded annotations");
    Ok(annotations)
}
