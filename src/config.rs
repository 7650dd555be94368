use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::review::CrossHunkPolicy;

const CONFIG_FILE: &str = ".diff-anchor.toml";
const COMMIT_ID_ENV: &str = "REVIEW_COMMIT_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .diff-anchor.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Settings for the batched review submission
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidatorConfig {
    /// `strict` (default) or `file-union`
    #[serde(default)]
    pub cross_hunk: CrossHunkPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// Summary text of the review itself
    #[serde(default = "default_review_body")]
    pub body: String,
    #[serde(default = "default_review_event")]
    pub event: String,
    /// Head commit the comments are anchored to. Falls back to REVIEW_COMMIT_ID.
    pub commit_id: Option<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            body: default_review_body(),
            event: default_review_event(),
            commit_id: None,
        }
    }
}

fn default_review_body() -> String {
    "AI Code Review Report".to_string()
}

fn default_review_event() -> String {
    "COMMENT".to_string()
}

impl Config {
    /// Load configuration from `path`, or from .diff-anchor.toml in the
    /// current directory when no path is given.
    /// Returns default config if the default file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.review.commit_id.is_none() {
            if let Ok(commit_id) = std::env::var(COMMIT_ID_ENV) {
                config.review.commit_id = Some(commit_id);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.validator.cross_hunk, CrossHunkPolicy::Strict);
        assert_eq!(config.review.event, "COMMENT");
        assert_eq!(config.review.body, "AI Code Review Report");
        assert!(config.review.commit_id.is_none());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[validator]
cross_hunk = "file-union"

[review]
body = "Automated review"
commit_id = "abc123"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validator.cross_hunk, CrossHunkPolicy::FileUnion);
        assert_eq!(config.review.body, "Automated review");
        assert_eq!(config.review.event, "COMMENT");
        assert_eq!(config.review.commit_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_empty_config_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.validator.cross_hunk, CrossHunkPolicy::Strict);
        assert_eq!(config.review.event, "COMMENT");
    }

    #[test]
    fn test_unknown_policy_is_an_error() {
        let result: Result<Config, _> = toml::from_str("[validator]\ncross_hunk = \"intersect\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[review]\nevent = \"REQUEST_CHANGES\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.review.event, "REQUEST_CHANGES");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
