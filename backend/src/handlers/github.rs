//! Upstream proxy handlers
//!
//! Thin pass-throughs to the GitHub API, plus the overview join and the
//! server-side file renderer.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;

use crate::AppState;
use crate::error::AppError;
use crate::render::{FileViewer, ViewMode, stylesheet};
use crate::services::{CommitHistory, RepoOverview};

type RepoPath = web::Path<(String, String)>;

const NEXT_PAGE_HEADER: &str = "X-Next-Page";

#[derive(Debug, Default, Deserialize)]
pub struct ContentsQuery {
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub path: String,
    #[serde(default, rename = "ref")]
    pub git_ref: String,
    /// Requested mode; defaults to the file kind's own default
    #[serde(default)]
    pub mode: Option<ViewMode>,
}

#[derive(Debug, Deserialize)]
pub struct CommitsQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// GET /api/repos/{owner}/{repo}
pub async fn get_repo(
    state: web::Data<AppState>,
    path: RepoPath,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let info = state
        .upstream
        .repo_info(&owner, &repo)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch repository info", e))?;
    Ok(HttpResponse::Ok().json(info))
}

/// GET /api/repos/{owner}/{repo}/overview
pub async fn get_overview(
    state: web::Data<AppState>,
    path: RepoPath,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let overview = RepoOverview::load(state.upstream.as_ref(), &owner, &repo)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch repository overview", e))?;
    Ok(HttpResponse::Ok().json(overview))
}

/// GET /api/repos/{owner}/{repo}/contents?path=&ref=
pub async fn get_contents(
    state: web::Data<AppState>,
    path: RepoPath,
    query: web::Query<ContentsQuery>,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let contents = state
        .upstream
        .contents(&owner, &repo, &query.path, &query.git_ref)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch contents", e))?;
    Ok(HttpResponse::Ok().json(contents))
}

/// GET /api/repos/{owner}/{repo}/file?path=&ref=
pub async fn get_file(
    state: web::Data<AppState>,
    path: RepoPath,
    query: web::Query<ContentsQuery>,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let file = state
        .upstream
        .file(&owner, &repo, &query.path, &query.git_ref)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch file", e))?;
    Ok(HttpResponse::Ok().json(file))
}

/// GET /api/repos/{owner}/{repo}/render?path=&ref=&mode=
///
/// Fetch a file and run it through the viewer. Asking for a preview of a
/// plain code file yields the code view.
pub async fn render_file(
    state: web::Data<AppState>,
    path: RepoPath,
    query: web::Query<RenderQuery>,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let query = query.into_inner();

    let payload = state
        .upstream
        .file(&owner, &repo, &query.path, &query.git_ref)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch file", e))?;
    if payload.is_array() {
        return Err(AppError::Validation(format!(
            "Not a file: {}",
            query.path
        )));
    }

    let content = payload
        .get("decodedContent")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let filename = payload
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_else(|| query.path.rsplit('/').next().unwrap_or(&query.path));

    let mut viewer = FileViewer::open(filename, content);
    if let Some(mode) = query.mode {
        viewer.set_mode(mode);
    }
    Ok(HttpResponse::Ok().json(viewer.render()))
}

/// GET /api/repos/{owner}/{repo}/commits?page=
///
/// One page of commits. `X-Next-Page` is set while a full page came back.
pub async fn list_commits(
    state: web::Data<AppState>,
    path: RepoPath,
    query: web::Query<CommitsQuery>,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let mut history = CommitHistory::starting_at(owner, repo, query.page);
    history
        .load_more(state.upstream.as_ref())
        .await
        .map_err(|e| AppError::upstream("Failed to fetch commits", e))?;

    let mut response = HttpResponse::Ok();
    if history.has_more() {
        response.insert_header((NEXT_PAGE_HEADER, history.next_page().to_string()));
    }
    Ok(response.json(history.commits()))
}

/// GET /api/repos/{owner}/{repo}/commits/{sha}
pub async fn get_commit(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, AppError> {
    let (owner, repo, sha) = path.into_inner();
    let commit = state
        .upstream
        .commit(&owner, &repo, &sha)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch commit", e))?;
    Ok(HttpResponse::Ok().json(commit))
}

/// GET /api/repos/{owner}/{repo}/branches
pub async fn list_branches(
    state: web::Data<AppState>,
    path: RepoPath,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let branches = state
        .upstream
        .branches(&owner, &repo)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch branches", e))?;
    Ok(HttpResponse::Ok().json(branches))
}

/// GET /api/repos/{owner}/{repo}/languages
pub async fn get_languages(
    state: web::Data<AppState>,
    path: RepoPath,
) -> Result<HttpResponse, AppError> {
    let (owner, repo) = path.into_inner();
    let languages = state
        .upstream
        .languages(&owner, &repo)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch languages", e))?;
    Ok(HttpResponse::Ok().json(languages))
}

/// GET /api/highlight.css
pub async fn highlight_css() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(stylesheet())
}

/// Configure upstream proxy routes
pub fn configure_github_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/highlight.css").route(web::get().to(highlight_css)));
    cfg.service(
        web::scope("/repos/{owner}/{repo}")
            .route("", web::get().to(get_repo))
            .route("/overview", web::get().to(get_overview))
            .route("/contents", web::get().to(get_contents))
            .route("/file", web::get().to(get_file))
            .route("/render", web::get().to(render_file))
            .route("/commits", web::get().to(list_commits))
            .route("/commits/{sha}", web::get().to(get_commit))
            .route("/branches", web::get().to(list_branches))
            .route("/languages", web::get().to(get_languages)),
    );
}
