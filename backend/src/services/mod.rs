pub mod admin_auth;
pub mod browse;
pub mod github;
pub mod history;
pub mod overview;
pub mod store;

pub use admin_auth::{AdminAuth, AdminGuard, AuthError};
pub use browse::{BrowseSession, BrowseTarget, BrowseView, Navigation};
pub use github::{GitHubClient, GitHubError, RepoRef, UpstreamApi, parse_github_url};
pub use history::CommitHistory;
pub use overview::RepoOverview;
pub use store::{RepoStore, StoreError};
