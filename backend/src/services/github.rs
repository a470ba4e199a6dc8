//! Upstream GitHub REST API client
//!
//! All upstream calls are plain GETs returning JSON. The [`UpstreamApi`]
//! trait exposes one required method, `get_json`; the typed endpoint
//! helpers are provided methods that build the request path, so an
//! in-memory implementation only needs to answer by path.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::models::UpstreamRepo;

/// Page size the commit list is requested with
pub const COMMITS_PER_PAGE: u32 = 30;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "repofolio";

/// Only the path and query of URLs built on this root are kept
const ENDPOINT_ROOT: &str = "https://api.github.com/";

/// Errors from the upstream API
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Network or transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the API
    #[error("GitHub API error: {status} {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A path segment that would escape its repository or cannot be encoded
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Client configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// GET `endpoint` (path plus optional query, starting with `/`)
    async fn get_json(&self, endpoint: &str) -> Result<Value, GitHubError>;

    async fn repo_info(&self, owner: &str, repo: &str) -> Result<Value, GitHubError> {
        self.get_json(&endpoint(&[owner, repo], &[], &[])?).await
    }

    async fn contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Value, GitHubError> {
        self.get_json(&contents_endpoint(owner, repo, path, git_ref)?)
            .await
    }

    /// File payload with `decodedContent` added when the API returned content
    async fn file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Value, GitHubError> {
        let payload = self.contents(owner, repo, path, git_ref).await?;
        with_decoded_content(payload)
    }

    async fn commits(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, GitHubError> {
        let (page, per_page) = (page.to_string(), per_page.to_string());
        let query = [("page", page.as_str()), ("per_page", per_page.as_str())];
        self.get_json(&endpoint(&[owner, repo, "commits"], &[], &query)?)
            .await
    }

    async fn commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Value, GitHubError> {
        self.get_json(&endpoint(&[owner, repo, "commits", sha], &[], &[])?)
            .await
    }

    async fn branches(&self, owner: &str, repo: &str) -> Result<Value, GitHubError> {
        self.get_json(&endpoint(&[owner, repo, "branches"], &[], &[])?)
            .await
    }

    async fn languages(&self, owner: &str, repo: &str) -> Result<Value, GitHubError> {
        self.get_json(&endpoint(&[owner, repo, "languages"], &[], &[])?)
            .await
    }

    /// Metadata needed to add a repository to the curated list
    async fn repo_metadata(&self, owner: &str, repo: &str) -> Result<UpstreamRepo, GitHubError> {
        let info = self.repo_info(owner, repo).await?;
        serde_json::from_value(info).map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

fn contents_endpoint(
    owner: &str,
    repo: &str,
    path: &str,
    git_ref: &str,
) -> Result<String, GitHubError> {
    let mut tail: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if tail.is_empty() {
        // directory listing of the root keeps its trailing slash
        tail.push("");
    }
    let ref_pair = [("ref", git_ref)];
    let query: &[(&str, &str)] = if git_ref.is_empty() { &[] } else { &ref_pair };
    endpoint(&[owner, repo, "contents"], &tail, query)
}

/// Build `/repos/<fixed>/<tail>?<query>` with every segment percent-encoded.
/// `fixed` segments must be non-empty; no segment may be `.` or `..`.
fn endpoint(fixed: &[&str], tail: &[&str], query: &[(&str, &str)]) -> Result<String, GitHubError> {
    for segment in fixed {
        if segment.is_empty() {
            return Err(GitHubError::InvalidPath("empty path segment".into()));
        }
    }
    if let Some(bad) = fixed
        .iter()
        .chain(tail)
        .find(|s| matches!(**s, "." | ".."))
    {
        return Err(GitHubError::InvalidPath(format!("relative segment '{bad}'")));
    }

    let mut url =
        Url::parse(ENDPOINT_ROOT).map_err(|e| GitHubError::Configuration(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| GitHubError::InvalidPath("base URL cannot hold a path".into()))?
        .clear()
        .push("repos")
        .extend(fixed)
        .extend(tail);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    })
}

/// Decode a base64 `content` field (GitHub wraps it at 60 columns)
pub fn decode_content(encoded: &str) -> Result<String, GitHubError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GitHubError::Decode(format!("invalid base64 content: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn with_decoded_content(mut payload: Value) -> Result<Value, GitHubError> {
    let decoded = match payload.get("content").and_then(Value::as_str) {
        Some(content) if !content.is_empty() => decode_content(content)?,
        _ => return Ok(payload),
    };
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("decodedContent".to_string(), Value::String(decoded));
    }
    Ok(payload)
}

/// Owner and repository name parsed from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Accepts `https://github.com/owner/repo[/...]` or bare `owner/repo`.
/// A trailing `.git` is dropped.
pub fn parse_github_url(input: &str) -> Option<RepoRef> {
    let input = input.trim();

    let (owner, rest) = if let Some(idx) = input.find("github.com/") {
        let tail = &input[idx + "github.com/".len()..];
        let (owner, rest) = tail.split_once('/')?;
        let repo = rest
            .split(|c: char| c == '/' || c == '#' || c == '?' || c.is_whitespace())
            .next()
            .unwrap_or("");
        (owner, repo)
    } else {
        let (owner, repo) = input.split_once('/')?;
        if repo.contains('/') || repo.chars().any(char::is_whitespace) {
            return None;
        }
        (owner, repo)
    };

    let repo = rest.strip_suffix(".git").unwrap_or(rest);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// reqwest-backed client for the real API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GitHubError::Configuration(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GitHubError::Configuration(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GitHubError> {
        Self::new(&config.github_api_url, config.github_token.as_deref())
    }
}

#[async_trait]
impl UpstreamApi for GitHubClient {
    async fn get_json(&self, endpoint: &str) -> Result<Value, GitHubError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.as_str())
                    .to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockUpstream;
    use serde_json::json;

    #[test]
    fn test_parse_github_url() {
        let expect = |owner: &str, repo: &str| {
            Some(RepoRef {
                owner: owner.into(),
                repo: repo.into(),
            })
        };
        assert_eq!(parse_github_url("octocat/Hello-World"), expect("octocat", "Hello-World"));
        assert_eq!(
            parse_github_url("https://github.com/octocat/Hello-World"),
            expect("octocat", "Hello-World")
        );
        assert_eq!(
            parse_github_url("https://github.com/rust-lang/rust.git"),
            expect("rust-lang", "rust")
        );
        assert_eq!(
            parse_github_url("github.com/a/b/tree/main/src?x=1"),
            expect("a", "b")
        );
        assert_eq!(parse_github_url("https://github.com/a/b#readme"), expect("a", "b"));
        assert_eq!(parse_github_url("  a/b  "), expect("a", "b"));

        assert_eq!(parse_github_url("not a url"), None);
        assert_eq!(parse_github_url("a/b/c"), None);
        assert_eq!(parse_github_url("/b"), None);
        assert_eq!(parse_github_url("https://github.com/onlyowner"), None);
    }

    #[test]
    fn test_decode_content_with_line_breaks() {
        // "hello\nworld\n" wrapped as GitHub does
        assert_eq!(decode_content("aGVsbG8K\nd29ybGQK\n").unwrap(), "hello\nworld\n");
        assert!(matches!(decode_content("@@@"), Err(GitHubError::Decode(_))));
    }

    #[test]
    fn test_contents_endpoint() {
        assert_eq!(contents_endpoint("o", "r", "", "").unwrap(), "/repos/o/r/contents/");
        assert_eq!(
            contents_endpoint("o", "r", "/src/main.rs", "dev").unwrap(),
            "/repos/o/r/contents/src/main.rs?ref=dev"
        );
        assert_eq!(
            contents_endpoint("o", "r", "", "master").unwrap(),
            "/repos/o/r/contents/?ref=master"
        );
    }

    #[test]
    fn test_endpoint_segments_are_encoded() {
        assert_eq!(
            contents_endpoint("o", "r", "dir/a#b.md", "").unwrap(),
            "/repos/o/r/contents/dir/a%23b.md"
        );
        assert_eq!(
            contents_endpoint("o", "r", "x?.py", "").unwrap(),
            "/repos/o/r/contents/x%3F.py"
        );
        assert_eq!(
            contents_endpoint("o", "r", "notes/my file.txt", "").unwrap(),
            "/repos/o/r/contents/notes/my%20file.txt"
        );

        // a crafted ref stays a single query value
        let endpoint = contents_endpoint("o", "r", "a.md", "main&per_page=1#x").unwrap();
        assert_eq!(endpoint, "/repos/o/r/contents/a.md?ref=main%26per_page%3D1%23x");
        let url = Url::parse(&format!("https://api.github.com{endpoint}")).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("ref".to_string(), "main&per_page=1#x".to_string())]);
    }

    #[test]
    fn test_endpoint_stays_inside_repository() {
        for path in ["../../../user/emails", "src/../../x", "./a", "a/.."] {
            assert!(
                matches!(contents_endpoint("o", "r", path, ""), Err(GitHubError::InvalidPath(_))),
                "{path}"
            );
        }

        // the encoded form still resolves under /repos/o/r/
        let endpoint = contents_endpoint("o", "r", "..%2F..%2Fuser", "").unwrap();
        let url = Url::parse(&format!("https://api.github.com{endpoint}")).unwrap();
        assert!(url.path().starts_with("/repos/o/r/contents/"), "{url}");
    }

    #[tokio::test]
    async fn test_relative_segments_never_reach_upstream() {
        let upstream = MockUpstream::new();
        let err = upstream.commit("o", "r", "..").await.unwrap_err();
        assert!(matches!(err, GitHubError::InvalidPath(_)));
        let err = upstream.repo_info("..", "emails").await.unwrap_err();
        assert!(matches!(err, GitHubError::InvalidPath(_)));
        let err = upstream
            .file("o", "r", "../../../user/emails", "")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::InvalidPath(_)));
        assert_eq!(upstream.call_count(), 0);

        upstream.respond("/repos/o/r/commits?page=2&per_page=30", json!([]));
        assert_eq!(upstream.commits("o", "r", 2, 30).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_file_adds_decoded_content() {
        let upstream = MockUpstream::new();
        upstream.respond(
            "/repos/o/r/contents/README.md",
            json!({"name": "README.md", "encoding": "base64", "content": "IyBIaQo="}),
        );
        upstream.respond(
            "/repos/o/r/contents/big.bin?ref=main",
            json!({"name": "big.bin", "content": ""}),
        );

        let file = upstream.file("o", "r", "README.md", "").await.unwrap();
        assert_eq!(file["decodedContent"], "# Hi\n");
        assert_eq!(file["name"], "README.md");

        let file = upstream.file("o", "r", "big.bin", "main").await.unwrap();
        assert!(file.get("decodedContent").is_none());
    }

    #[tokio::test]
    async fn test_repo_metadata() {
        let upstream = MockUpstream::new();
        upstream.respond(
            "/repos/octocat/Hello-World",
            json!({
                "full_name": "octocat/Hello-World",
                "description": "My first repository",
                "language": null,
                "stargazers_count": 42,
                "forks_count": 7,
                "html_url": "https://github.com/octocat/Hello-World"
            }),
        );

        let meta = upstream.repo_metadata("octocat", "Hello-World").await.unwrap();
        assert_eq!(meta.description.as_deref(), Some("My first repository"));
        assert_eq!(meta.language, None);
        assert_eq!(meta.stargazers_count, Some(42));

        let err = upstream.repo_metadata("octocat", "missing").await.unwrap_err();
        assert!(matches!(err, GitHubError::Status { status: 404, .. }));
    }

    #[test]
    fn test_client_builds_with_token() {
        assert!(GitHubClient::new("https://api.github.com/", Some("ghp_x")).is_ok());
        assert!(GitHubClient::new("https://api.github.com", Some("bad\ntoken")).is_err());
    }
}
