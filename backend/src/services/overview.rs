//! Repository overview: metadata, branches and languages fetched together

use serde::Serialize;
use serde_json::Value;

use super::github::{GitHubError, UpstreamApi};

#[derive(Debug, Clone, Serialize)]
pub struct RepoOverview {
    pub info: Value,
    pub branches: Value,
    pub languages: Value,
}

impl RepoOverview {
    /// Issue the three fetches concurrently. Nothing is returned unless all
    /// three succeed.
    pub async fn load(
        upstream: &dyn UpstreamApi,
        owner: &str,
        repo: &str,
    ) -> Result<Self, GitHubError> {
        let (info, branches, languages) = tokio::try_join!(
            upstream.repo_info(owner, repo),
            upstream.branches(owner, repo),
            upstream.languages(owner, repo),
        )?;

        Ok(Self {
            info,
            branches,
            languages,
        })
    }
}
