use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PAGE_LIMIT: u32 = 15;
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub environment: String,
    pub page_limit: u32,
    pub max_page_limit: u32,
    pub session_file: PathBuf,
    pub lookup_cache_ttl_secs: u64,
    pub lookup_cache_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let max_page_limit = parse_or("MAX_PAGE_LIMIT", DEFAULT_MAX_PAGE_LIMIT).max(1);

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string())
                .trim_end_matches('/')
                .to_string(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            page_limit: parse_or("PAGE_LIMIT", DEFAULT_PAGE_LIMIT).clamp(1, max_page_limit),
            max_page_limit,
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".hrpanel-session.json")),
            lookup_cache_ttl_secs: parse_or("LOOKUP_CACHE_TTL_SECS", 60),
            lookup_cache_capacity: parse_or("LOOKUP_CACHE_CAPACITY", 500),
        })
    }

    /// Configuration pointing at an explicit base URL, everything else defaulted.
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            environment: "test".to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            session_file: PathBuf::from(".hrpanel-session.json"),
            lookup_cache_ttl_secs: 60,
            lookup_cache_capacity: 500,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Joins a resource path onto the base URL.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
