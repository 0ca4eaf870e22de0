// GitHub API module.
// Provides the HTTP client and the repository listing used on a cache miss.

pub mod client;
pub mod endpoints;
pub mod types;

#[cfg(test)]
mod test_server;

pub use client::GitHubClient;
pub use endpoints::{GitHubSource, RepositorySource};
pub use types::*;
