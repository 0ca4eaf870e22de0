// Cache path utilities.
// Locates the home directory and the files ghls keeps there.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Name of the cache file under the home directory.
pub const CACHE_FILE_NAME: &str = ".ghls_cache";

/// The current user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Path to the repository cache file (`~/.ghls_cache`).
pub fn cache_path(home: &Path) -> PathBuf {
    home.join(CACHE_FILE_NAME)
}

/// Path to hub's config file, used as a token fallback.
pub fn hub_config_path(home: &Path) -> PathBuf {
    home.join(".config").join("hub")
}

/// Directory holding `path`, where its replacement is staged.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
