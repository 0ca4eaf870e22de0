// GitHub token lookup.
// Tries GITHUB_TOKEN first, then the oauth_token hub keeps in ~/.config/hub.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{GhlsError, Result};

const HUB_HOST: &str = "github.com";

/// hub's config: host name to a list of account entries.
type HubConfig = HashMap<String, Vec<HashMap<String, serde_yaml::Value>>>;

/// Resolve the token to authenticate with.
///
/// A non-empty `env_token` wins; otherwise the hub config at `hub_path` is consulted.
pub fn resolve_token(env_token: Option<&str>, hub_path: &Path) -> Result<String> {
    if let Some(token) = env_token.filter(|t| !t.is_empty()) {
        debug!("using token from environment");
        return Ok(token.to_string());
    }

    let contents = match fs::read_to_string(hub_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(GhlsError::MissingToken),
        Err(e) => return Err(e.into()),
    };
    let token = token_from_hub_config(&contents)?;
    debug!(path = %hub_path.display(), "using token from hub config");
    Ok(token)
}

fn token_from_hub_config(contents: &str) -> Result<String> {
    let config: HubConfig = serde_yaml::from_str(contents)?;

    config
        .get(HUB_HOST)
        .into_iter()
        .flatten()
        .find_map(|entry| {
            entry
                .get("oauth_token")
                .and_then(|v| v.as_str())
                .filter(|token| !token.is_empty())
        })
        .map(str::to_string)
        .ok_or(GhlsError::MissingToken)
}
