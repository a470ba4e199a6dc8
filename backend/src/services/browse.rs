//! Directory and file navigation within one repository
//!
//! Each navigation takes a ticket from a monotonically increasing counter.
//! When its fetch completes, the result is applied only if no newer
//! navigation has started since; otherwise it is dropped. Rapid clicks
//! therefore always settle on the last target, whatever order the
//! responses arrive in.
//!
//! The HTTP surface is stateless, so no handler holds a session; this is a
//! library helper for clients that keep one per visitor and drive it with
//! their own [`UpstreamApi`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::github::{GitHubError, UpstreamApi};
use crate::render::{FileViewer, RenderedView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseTarget {
    Directory(String),
    File(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BrowseView {
    Empty,
    Directory { path: String, entries: Value },
    File { path: String, view: RenderedView },
}

/// Outcome of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Applied,
    /// A newer navigation started before this one finished
    Superseded,
}

#[derive(Debug)]
pub struct BrowseSession {
    owner: String,
    repo: String,
    git_ref: String,
    generation: AtomicU64,
    view: RwLock<BrowseView>,
}

impl BrowseSession {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            generation: AtomicU64::new(0),
            view: RwLock::new(BrowseView::Empty),
        }
    }

    pub async fn view(&self) -> BrowseView {
        self.view.read().await.clone()
    }

    /// Fetch `target` and show it unless superseded. A failed fetch keeps
    /// the previous view.
    pub async fn navigate(
        &self,
        upstream: &dyn UpstreamApi,
        target: BrowseTarget,
    ) -> Result<Navigation, GitHubError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = self.fetch(upstream, target).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Dropping stale navigation result (ticket {ticket})");
            return Ok(Navigation::Superseded);
        }

        let next = fetched?;
        let mut view = self.view.write().await;
        // re-check under the lock so a newer result already written wins
        if self.generation.load(Ordering::SeqCst) != ticket {
            return Ok(Navigation::Superseded);
        }
        *view = next;
        Ok(Navigation::Applied)
    }

    async fn fetch(
        &self,
        upstream: &dyn UpstreamApi,
        target: BrowseTarget,
    ) -> Result<BrowseView, GitHubError> {
        match target {
            BrowseTarget::Directory(path) => {
                let entries = upstream
                    .contents(&self.owner, &self.repo, &path, &self.git_ref)
                    .await?;
                Ok(BrowseView::Directory { path, entries })
            }
            BrowseTarget::File(path) => {
                let payload = upstream
                    .file(&self.owner, &self.repo, &path, &self.git_ref)
                    .await?;
                let content = payload
                    .get("decodedContent")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let name = path.rsplit('/').next().unwrap_or(&path);
                let view = FileViewer::open(name, content).render();
                Ok(BrowseView::File { path, view })
            }
        }
    }
}
