//! Curated repository handlers
//!
//! Listing is public; adding and removing require the admin secret.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::error::AppError;
use crate::models::{AddRepoRequest, RemoveRepoRequest, RepoCatalog, RepoQuery, RepositoryEntry};
use crate::services::github::{GitHubError, parse_github_url};
use crate::services::{AdminAuth, AdminGuard};

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

impl SuccessResponse {
    fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}

/// POST /api/auth
///
/// Check the admin password. The admin panel calls this before showing
/// its controls, then sends the same secret as a bearer token.
pub async fn authenticate(
    auth: Option<web::Data<AdminAuth>>,
    body: web::Json<AuthRequest>,
) -> Result<HttpResponse, AppError> {
    let auth = auth.ok_or_else(|| AppError::Internal("Admin access not configured".into()))?;
    auth.verify(&body.password)
        .map_err(|_| AppError::Unauthorized("Invalid password".into()))?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// GET /api/repos
///
/// The curated list, optionally filtered by `q` and `language`.
pub async fn list_repos(
    state: web::Data<AppState>,
    query: web::Query<RepoQuery>,
) -> Result<HttpResponse, AppError> {
    let mut repos = state.store.list().await?;
    if !query.is_empty() {
        repos.retain(|r| query.matches(r));
    }
    Ok(HttpResponse::Ok().json(repos))
}

/// GET /api/catalog
///
/// Filtered list plus the language set and star total of the whole list.
pub async fn catalog(
    state: web::Data<AppState>,
    query: web::Query<RepoQuery>,
) -> Result<HttpResponse, AppError> {
    let repos = state.store.list().await?;
    Ok(HttpResponse::Ok().json(RepoCatalog::build(repos, &query)))
}

/// POST /api/repos
///
/// Add a repository by URL or `owner/repo`. Its metadata is copied from
/// upstream at the time of adding.
pub async fn add_repo(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    body: web::Json<AddRepoRequest>,
) -> Result<HttpResponse, AppError> {
    let repo_ref = parse_github_url(&body.url)
        .ok_or_else(|| AppError::Validation("Invalid GitHub URL".into()))?;
    let full_name = format!("{}/{}", repo_ref.owner, repo_ref.repo);

    let existing = state.store.list().await?;
    if existing.iter().any(|r| r.full_name == full_name) {
        return Err(AppError::Conflict(format!(
            "Repository already added: {full_name}"
        )));
    }

    let meta = state
        .upstream
        .repo_metadata(&repo_ref.owner, &repo_ref.repo)
        .await
        .map_err(|e| match e {
            GitHubError::Status { status: 404, .. } => {
                AppError::Validation(format!("Repository not found on GitHub: {full_name}"))
            }
            other => AppError::upstream("Failed to fetch repository", other),
        })?;

    let entry = RepositoryEntry::from_upstream(&repo_ref.owner, &repo_ref.repo, &meta);
    state.store.add(entry.clone()).await?;
    info!("Curated list now includes {full_name}");

    Ok(HttpResponse::Created().json(entry))
}

/// DELETE /api/repos
///
/// Remove by id. Unknown ids succeed without changing anything.
pub async fn remove_repo(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    body: web::Json<RemoveRepoRequest>,
) -> Result<HttpResponse, AppError> {
    state.store.remove(&body.id).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// Configure curated list and auth routes
pub fn configure_repo_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth").route(web::post().to(authenticate)));
    cfg.service(web::resource("/catalog").route(web::get().to(catalog)));
    cfg.service(
        web::resource("/repos")
            .route(web::get().to(list_repos))
            .route(web::post().to(add_repo))
            .route(web::delete().to(remove_repo)),
    );
}
