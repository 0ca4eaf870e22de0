//! Command-line flags and the run settings derived from them.
//!
//! `Settings` is built once in `main` and handed to the orchestrator; nothing
//! else reads flags or the environment.

use std::path::PathBuf;

use clap::Parser;

use crate::cache;
use crate::error::{GhlsError, Result};
use crate::github::client::GITHUB_API_BASE;

/// Environment variable checked first for a GitHub token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// List your GitHub repositories, cached locally for a day
#[derive(Parser, Debug, Clone)]
#[command(name = "ghls")]
#[command(version)]
pub struct Cli {
    /// Ignore the cache and fetch repositories from GitHub now
    #[arg(short = 'u', long = "update")]
    pub update: bool,

    /// Comma-separated fields to print: name, fullname, owner, stars,
    /// description, url, default_branch, pushed_at, created_at, updated_at
    #[arg(short = 'p', long = "params", value_name = "FIELDS", default_value = "")]
    pub params: String,

    /// List this user's public repositories instead of your own; always
    /// fetched live, the cache only holds your own repositories
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Neither read nor write the cache file
    #[arg(long)]
    pub no_cache: bool,

    /// Delete the cache file and exit
    #[arg(long)]
    pub clean: bool,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, value_name = "URL", default_value = GITHUB_API_BASE)]
    pub api_url: String,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything one run needs to know, resolved up front.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_path: PathBuf,
    pub hub_config_path: PathBuf,
    /// Value of `GITHUB_TOKEN` at startup, if set.
    pub env_token: Option<String>,
    pub api_url: String,
    pub refresh: bool,
    pub fields: String,
    pub user: Option<String>,
    pub use_cache: bool,
    pub clean: bool,
}

impl Settings {
    /// Resolve settings from flags, the real home directory, and the environment.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let home = cache::home_dir().ok_or(GhlsError::NoHomeDir)?;
        let env_token = std::env::var(TOKEN_ENV).ok();
        Ok(Self::new(cli, home, env_token))
    }

    pub fn new(cli: Cli, home: PathBuf, env_token: Option<String>) -> Self {
        let user = cli.user.filter(|u| !u.is_empty());
        Self {
            cache_path: cache::cache_path(&home),
            hub_config_path: cache::hub_config_path(&home),
            env_token,
            api_url: cli.api_url,
            refresh: cli.update,
            fields: cli.params,
            // The cache file is not keyed by user.
            use_cache: !cli.no_cache && user.is_none(),
            user,
            clean: cli.clean,
        }
    }
}
