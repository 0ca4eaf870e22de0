// Cache module for the local repository list.
// One line-delimited JSON file under the home directory, trusted for a day.

pub mod paths;
pub mod store;

pub use paths::{cache_path, home_dir, hub_config_path};
pub use store::{CACHE_TTL, PendingCache, load, load_at, remove, store};
