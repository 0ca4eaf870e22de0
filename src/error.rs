// Error types for ghls.
// Covers GitHub API failures, credential lookup, cache I/O, and output sinks.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhlsError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("GitHub token is not found (set GITHUB_TOKEN or configure hub)")]
    MissingToken,

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Hub config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Every output failed for {full_name}")]
    AllSinksFailed { full_name: String },

    #[error("{0}")]
    Other(String),
}

/// Reasons a cache file could not be used.
///
/// Every variant is treated as a miss by the caller; they stay distinct
/// so logs can say why a refetch happened.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache file {0} does not exist")]
    NotFound(PathBuf),

    #[error("cache file {0} is expired")]
    Expired(PathBuf),

    #[error("cache line {line} is malformed: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache line {line} has no full name")]
    InvalidRecord { line: usize },

    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Whether this error just means "no usable cache" rather than a broken one.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

pub type Result<T> = std::result::Result<T, GhlsError>;
