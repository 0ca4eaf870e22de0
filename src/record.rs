// Repository record shared by fetch, cache, and printers.
// A flat snapshot of one repository's descriptive metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::types::Repository;

/// One repository as ghls stores and prints it.
///
/// The serde keys match the cache file format, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub owner: String,
    pub stars: u64,
    pub url: String,
    #[serde(default)]
    pub default_branch: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepoRecord {
    /// A record is only usable when it names its owner-qualified repository.
    pub fn is_valid(&self) -> bool {
        !self.full_name.is_empty()
    }
}

impl From<Repository> for RepoRecord {
    fn from(repo: Repository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description.unwrap_or_default(),
            owner: repo.owner.login,
            stars: repo.stargazers_count,
            url: repo.html_url,
            default_branch: repo.default_branch.unwrap_or_default(),
            pushed_at: repo.pushed_at,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
pub(crate) fn sample_record(name: &str, stars: u64) -> RepoRecord {
    use chrono::TimeZone;

    let created = Utc.with_ymd_and_hms(2019, 3, 14, 9, 26, 53).unwrap()
        + chrono::Duration::nanoseconds(123_456_789);
    RepoRecord {
        name: name.to_string(),
        full_name: format!("testuser/{}", name),
        description: "this is test repository".to_string(),
        owner: "testuser".to_string(),
        stars,
        url: format!("https://github.com/testuser/{}", name),
        default_branch: "main".to_string(),
        pushed_at: Some(created + chrono::Duration::days(30)),
        created_at: created,
        updated_at: created + chrono::Duration::days(31),
    }
}
