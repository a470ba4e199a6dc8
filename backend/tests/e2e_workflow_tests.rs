//! End-to-End Workflow Integration Tests
//!
//! These tests drive complete visitor and admin journeys through the public
//! HTTP surface, with the upstream API replaced by `MockUpstream` and the
//! curated list stored in a temporary directory.

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use repofolio::handlers::{configure_github_routes, configure_repo_routes};
use repofolio::services::{BrowseSession, BrowseTarget, BrowseView, CommitHistory, Navigation};
use repofolio::testing::MockUpstream;
use repofolio::{AdminAuth, AppState, Config, RepoStore};

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &str = "portfolio-admin";

fn create_state(dir: &TempDir, upstream: Arc<MockUpstream>) -> web::Data<AppState> {
    let config = Config {
        host: "127.0.0.1".into(),
        port: 0,
        data_file: dir.path().join("data").join("repos.json"),
        github_api_url: "http://upstream.invalid".into(),
        github_token: None,
        admin_password: Some(SECRET.into()),
    };
    web::Data::new(AppState {
        store: RepoStore::new(&config.data_file),
        config,
        upstream,
    })
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(web::Data::new(AdminAuth::new(SECRET)))
                .service(
                    web::scope("/api")
                        .configure(configure_repo_routes)
                        .configure(configure_github_routes),
                ),
        )
        .await
    };
}

/// A small repository: metadata, two branches, a README, a notebook and
/// 31 commits spread over two pages.
fn seed_upstream() -> Arc<MockUpstream> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let upstream = MockUpstream::new();
    upstream.respond(
        "/repos/octocat/Hello-World",
        json!({
            "full_name": "octocat/Hello-World",
            "description": "My first repository on GitHub!",
            "language": "Python",
            "stargazers_count": 2500,
            "forks_count": 2100,
            "default_branch": "master",
            "html_url": "https://github.com/octocat/Hello-World"
        }),
    );
    upstream.respond(
        "/repos/octocat/Hello-World/branches",
        json!([{"name": "master"}, {"name": "test"}]),
    );
    upstream.respond("/repos/octocat/Hello-World/languages", json!({"Python": 4096}));
    upstream.respond(
        "/repos/octocat/Hello-World/contents/?ref=master",
        json!([
            {"name": "README", "path": "README", "type": "file"},
            {"name": "analysis.ipynb", "path": "analysis.ipynb", "type": "file"}
        ]),
    );
    upstream.respond(
        "/repos/octocat/Hello-World/contents/README?ref=master",
        json!({"name": "README", "content": STANDARD.encode("Hello World!\n")}),
    );

    let notebook = json!({
        "cells": [
            {"cell_type": "markdown", "source": ["# Analysis"]},
            {"cell_type": "code", "source": ["print(1)"], "execution_count": 1,
             "outputs": [{"output_type": "stream", "text": ["1\n"]}]}
        ],
        "metadata": {"kernelspec": {"display_name": "Python 3", "name": "python3"}}
    });
    upstream.respond(
        "/repos/octocat/Hello-World/contents/analysis.ipynb?ref=master",
        json!({"name": "analysis.ipynb", "content": STANDARD.encode(notebook.to_string())}),
    );

    let page = |n: usize, tag: &str| -> Value {
        Value::Array((0..n).map(|i| json!({"sha": format!("{tag}{i}")})).collect())
    };
    upstream.respond("/repos/octocat/Hello-World/commits?page=1&per_page=30", page(30, "p1-"));
    upstream.respond("/repos/octocat/Hello-World/commits?page=2&per_page=30", page(1, "p2-"));

    Arc::new(upstream)
}

fn admin_post(url: &str, secret: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/repos")
        .insert_header(("Authorization", format!("Bearer {secret}")))
        .set_json(json!({ "url": url }))
}

// ============================================================================
// Admin curation
// ============================================================================

#[actix_rt::test]
async fn test_admin_add_with_correct_and_incorrect_secret() {
    let dir = TempDir::new().unwrap();
    let state = create_state(&dir, seed_upstream());
    let app = init_app!(state);

    let resp = test::call_service(&app, admin_post("octocat/Hello-World", "wrong").to_request()).await;
    assert_eq!(resp.status(), 401);
    assert!(state.store.list().await.unwrap().is_empty());

    let resp = test::call_service(&app, admin_post("octocat/Hello-World", SECRET).to_request()).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fullName"], "octocat/Hello-World");

    // Persisted as pretty JSON under the (created) data directory
    let raw = std::fs::read_to_string(dir.path().join("data").join("repos.json")).unwrap();
    assert!(raw.contains("\"fullName\": \"octocat/Hello-World\""));
}

#[actix_rt::test]
async fn test_full_admin_lifecycle() {
    let dir = TempDir::new().unwrap();
    let state = create_state(&dir, seed_upstream());
    let app = init_app!(state);

    // Step 1: log in
    let req = test::TestRequest::post()
        .uri("/api/auth")
        .set_json(json!({"password": SECRET}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // Step 2: add via full URL
    let resp = test::call_service(
        &app,
        admin_post("https://github.com/octocat/Hello-World.git", SECRET).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let entry: Value = test::read_body_json(resp).await;

    // Step 3: the home view sees it
    let req = test::TestRequest::get().uri("/api/catalog?q=first").to_request();
    let catalog: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(catalog["repos"][0]["id"], entry["id"]);
    assert_eq!(catalog["languages"], json!(["Python"]));
    assert_eq!(catalog["totalStars"], 2500);

    // Step 4: adding again is a conflict
    let resp = test::call_service(&app, admin_post("octocat/Hello-World", SECRET).to_request()).await;
    assert_eq!(resp.status(), 409);

    // Step 5: remove
    let req = test::TestRequest::delete()
        .uri("/api/repos")
        .insert_header(("Authorization", format!("Bearer {SECRET}")))
        .set_json(json!({"id": entry["id"]}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get().uri("/api/repos").to_request();
    let list: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(list, json!([]));
}

// ============================================================================
// Visitor browsing
// ============================================================================

#[actix_rt::test]
async fn test_visitor_browses_repository() {
    let dir = TempDir::new().unwrap();
    let upstream = seed_upstream();
    let state = create_state(&dir, upstream.clone());
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/repos/octocat/Hello-World/overview")
        .to_request();
    let overview: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(overview["info"]["default_branch"], "master");
    assert_eq!(overview["branches"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/repos/octocat/Hello-World/contents?ref=master")
        .to_request();
    let root: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(root.as_array().unwrap().len(), 2);

    // README has no extension: plain code view, no toggle
    let req = test::TestRequest::get()
        .uri("/api/repos/octocat/Hello-World/render?path=README&ref=master")
        .to_request();
    let view: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(view["kind"], "code");
    assert_eq!(view["toggle"], false);
    assert_eq!(view["body"]["lines"][0], "Hello World!");

    // Notebook preview
    let req = test::TestRequest::get()
        .uri("/api/repos/octocat/Hello-World/render?path=analysis.ipynb&ref=master")
        .to_request();
    let view: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(view["kind"], "notebook");
    assert_eq!(view["body"]["type"], "notebook");
    let notebook = &view["body"]["notebook"];
    assert_eq!(notebook["kernel"], "Python 3");
    assert_eq!(notebook["cells"][1]["label"], "Code");
    assert_eq!(notebook["cells"][1]["executionMarker"], "[1]");
    assert!(view["body"]["html"].as_str().unwrap().contains("2 cells"));
}

#[tokio::test]
async fn test_browse_session_and_commit_history() {
    let upstream = seed_upstream();

    let session = BrowseSession::new("octocat", "Hello-World", "master");
    let nav = session
        .navigate(&*upstream, BrowseTarget::Directory(String::new()))
        .await
        .unwrap();
    assert_eq!(nav, Navigation::Applied);
    session
        .navigate(&*upstream, BrowseTarget::File("analysis.ipynb".into()))
        .await
        .unwrap();
    assert!(matches!(session.view().await, BrowseView::File { ref path, .. } if path == "analysis.ipynb"));

    let mut history = CommitHistory::new("octocat", "Hello-World");
    history.load_more(&*upstream).await.unwrap();
    assert!(history.has_more());
    history.load_more(&*upstream).await.unwrap();
    assert!(!history.has_more());
    assert_eq!(history.commits().len(), 31);
    assert_eq!(history.commits()[30]["sha"], "p2-0");
}
