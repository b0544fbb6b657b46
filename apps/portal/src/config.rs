use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Portal configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub page_size: usize,
    /// Where the session survives between runs. `None` keeps it in memory only.
    pub session_file: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let page_size = std::env::var("PORTAL_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<usize>()
            .context("PORTAL_PAGE_SIZE must be a positive integer")?;
        if page_size == 0 {
            bail!("PORTAL_PAGE_SIZE must be a positive integer");
        }

        Ok(Config {
            api_url: require_env("PORTAL_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            page_size,
            session_file: std::env::var("PORTAL_SESSION_FILE")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing at `api_url` with defaults everywhere else.
    pub fn for_api(api_url: impl Into<String>) -> Self {
        Config {
            api_url: api_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            session_file: None,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
