//! Commit history pager
//!
//! Commits are loaded one page of [`COMMITS_PER_PAGE`] at a time and
//! appended to what is already held. A short page means the history is
//! exhausted. The `/commits` handler serves one page through a pager
//! started at the requested page.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::github::{COMMITS_PER_PAGE, GitHubError, UpstreamApi};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistory {
    owner: String,
    repo: String,
    commits: Vec<Value>,
    next_page: u32,
    has_more: bool,
}

impl CommitHistory {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            commits: Vec::new(),
            next_page: 1,
            has_more: true,
        }
    }

    /// Pager whose first load fetches `page` (pages are 1-based)
    pub fn starting_at(owner: impl Into<String>, repo: impl Into<String>, page: u32) -> Self {
        Self {
            next_page: page.max(1),
            ..Self::new(owner, repo)
        }
    }

    pub fn commits(&self) -> &[Value] {
        &self.commits
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Fetch the next page and append it. Returns how many commits were
    /// added. On error nothing changes, so the call can be repeated.
    pub async fn load_more(&mut self, upstream: &dyn UpstreamApi) -> Result<usize, GitHubError> {
        if !self.has_more {
            return Ok(0);
        }

        let page = upstream
            .commits(&self.owner, &self.repo, self.next_page, COMMITS_PER_PAGE)
            .await?;
        let page = match page {
            Value::Array(items) => items,
            other => {
                return Err(GitHubError::Decode(format!(
                    "expected commit array, got {}",
                    type_name(&other)
                )));
            }
        };

        let loaded = page.len();
        debug!(
            "Loaded {loaded} commits for {}/{} (page {})",
            self.owner, self.repo, self.next_page
        );
        self.has_more = loaded == COMMITS_PER_PAGE as usize;
        self.next_page += 1;
        self.commits.extend(page);
        Ok(loaded)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
