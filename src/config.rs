use anyhow::{Context, Result};
use std::{env, net::SocketAddr, time::Duration};

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w342";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub image_base: String,
    pub language: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Config {
    /// Config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_TMDB_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("TMDB_API_KEY must be set"))?;

        let mut config = Self::new(api_key);
        if let Some(base) = non_empty_var("TMDB_BASE_URL") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        let bind = non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("Invalid BIND_ADDR '{}'", bind))?;
        Ok(config)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
