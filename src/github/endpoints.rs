// GitHub API endpoint functions.
// Lists repositories page by page and exposes the listing behind a trait for the orchestrator.

use tracing::debug;

use crate::error::Result;
use crate::record::RepoRecord;

use super::client::{GitHubClient, next_page_url};
use super::types::Repository;

const PER_PAGE: u32 = 100;

/// Anything that can produce the full repository list for a user.
///
/// `user` of `None` means the authenticated user, including private repositories.
#[allow(async_fn_in_trait)]
pub trait RepositorySource {
    async fn list(&mut self, user: Option<&str>, token: &str) -> Result<Vec<RepoRecord>>;
}

/// Repository source backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    base_url: String,
}

impl GitHubSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl RepositorySource for GitHubSource {
    async fn list(&mut self, user: Option<&str>, token: &str) -> Result<Vec<RepoRecord>> {
        let mut client = GitHubClient::new(token, &self.base_url)?;
        let repos = client.list_repositories(user).await?;
        Ok(repos.into_iter().map(RepoRecord::from).collect())
    }
}

/// Path segments listing the repositories of `user`, or of the token's owner.
fn repos_segments(user: Option<&str>) -> Vec<&str> {
    match user {
        Some(user) if !user.is_empty() => vec!["users", user, "repos"],
        _ => vec!["user", "repos"],
    }
}

impl GitHubClient {
    /// Get every repository for a user, following `Link` pagination to the end.
    pub async fn list_repositories(&mut self, user: Option<&str>) -> Result<Vec<Repository>> {
        let params = [("per_page", PER_PAGE.to_string()), ("page", "1".to_string())];
        let mut response = self
            .get_with_params(&repos_segments(user), &params)
            .await?;

        let mut repositories = Vec::new();
        loop {
            let next = next_page_url(&response);
            let page: Vec<Repository> = response.json().await?;
            debug!(
                count = page.len(),
                remaining = self.rate_limit().remaining,
                "fetched repository page"
            );
            repositories.extend(page);

            match next {
                Some(url) => response = self.get_url(&url).await?,
                None => break,
            }
        }

        Ok(repositories)
    }
}
