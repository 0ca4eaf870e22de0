// GitHub API response types.
// Only the repository fields ghls prints or caches are deserialized.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GitHub user or organization owning a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
}

/// GitHub repository as returned by the repository list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub html_url: String,
    pub default_branch: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
