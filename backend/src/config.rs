use std::env;
use std::path::PathBuf;

/// Default upstream API base URL
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Location of the curated repository list
    pub data_file: PathBuf,
    /// Upstream GitHub REST API base URL
    pub github_api_url: String,
    /// Optional bearer token sent to the upstream API
    pub github_token: Option<String>,
    /// Admin shared secret; admin routes are unavailable when unset
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let data_file = env::var("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data").join("repos.json"));

        let github_api_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string());
        if !github_api_url.starts_with("http://") && !github_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("GITHUB_API_URL"));
        }

        let github_token = non_empty_var("GITHUB_TOKEN");
        let admin_password = non_empty_var("ADMIN_PASSWORD");

        Ok(Self {
            host,
            port,
            data_file,
            github_api_url,
            github_token,
            admin_password,
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
