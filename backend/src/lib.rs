//! Repofolio - a curated GitHub repository portfolio
//!
//! This library provides the curated list store, the upstream GitHub proxy
//! and the file rendering pipeline behind the portfolio's HTTP API.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod services;
pub mod testing;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use models::{RepoCatalog, RepoQuery, RepositoryEntry};
pub use render::{FileViewer, RenderKind, RenderedView, ViewMode};
pub use services::{
    AdminAuth, AdminGuard, GitHubClient, GitHubError, RepoStore, StoreError, UpstreamApi,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: RepoStore,
    pub upstream: Arc<dyn UpstreamApi>,
}
