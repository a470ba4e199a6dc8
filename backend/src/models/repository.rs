//! Curated repository model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One curated repository, as persisted in the list store.
///
/// `full_name` (`owner/name`) is unique across the list. Entries are never
/// updated in place; they are added and removed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    pub url: String,
    pub added_at: DateTime<Utc>,
}

impl RepositoryEntry {
    /// Build a fresh entry from upstream metadata
    pub fn from_upstream(owner: &str, name: &str, meta: &UpstreamRepo) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: format!("{owner}/{name}"),
            description: meta.description.clone().unwrap_or_default(),
            language: meta
                .language
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            stars: meta.stargazers_count.unwrap_or(0),
            forks: meta.forks_count.unwrap_or(0),
            url: meta.html_url.clone(),
            added_at: Utc::now(),
        }
    }

    /// Case-insensitive substring match over name, description and language
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.full_name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.language.to_lowercase().contains(&needle)
    }
}

/// The subset of upstream repository metadata needed to create an entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamRepo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
    #[serde(default)]
    pub forks_count: Option<u64>,
    #[serde(default)]
    pub html_url: String,
}

/// Request body for adding a repository
#[derive(Debug, Clone, Deserialize)]
pub struct AddRepoRequest {
    pub url: String,
}

/// Request body for removing a repository
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveRepoRequest {
    pub id: String,
}

/// Query parameters for listing the curated repositories
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoQuery {
    /// Substring filter
    #[serde(default)]
    pub q: Option<String>,
    /// Exact language filter; `all` or absent disables it
    #[serde(default)]
    pub language: Option<String>,
}

impl RepoQuery {
    pub fn is_empty(&self) -> bool {
        self.q.as_deref().is_none_or(str::is_empty)
            && self.language.as_deref().is_none_or(|l| l.is_empty() || l == "all")
    }

    pub fn matches(&self, entry: &RepositoryEntry) -> bool {
        let search = self
            .q
            .as_deref()
            .is_none_or(|q| q.is_empty() || entry.matches_search(q));
        let language = match self.language.as_deref() {
            None | Some("") | Some("all") => true,
            Some(lang) => entry.language == lang,
        };
        search && language
    }
}

/// Home-view summary of the curated list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoCatalog {
    pub repos: Vec<RepositoryEntry>,
    /// Distinct non-empty languages over the whole list, sorted
    pub languages: Vec<String>,
    pub total_stars: u64,
}

impl RepoCatalog {
    /// Summarise `all`, keeping only the entries accepted by `query`
    pub fn build(all: Vec<RepositoryEntry>, query: &RepoQuery) -> Self {
        let mut languages: Vec<String> = all
            .iter()
            .map(|r| r.language.clone())
            .filter(|l| !l.is_empty())
            .collect();
        languages.sort();
        languages.dedup();
        let total_stars = all.iter().map(|r| r.stars).sum();
        let repos = all.into_iter().filter(|r| query.matches(r)).collect();

        Self {
            repos,
            languages,
            total_stars,
        }
    }
}
