use anyhow::Result;
use std::str::FromStr;
use std::time::Duration;

/// Which index implementation backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    /// SQLite FTS5, the production backend
    Sqlite,
    /// Process-local index for demos and tests. Its query syntax is a
    /// subset of FTS5: bare terms and quoted phrases, no operators.
    Memory,
}

impl IndexBackend {
    /// Whether this backend is meant only for demos and tests
    pub fn is_demo_only(&self) -> bool {
        matches!(self, IndexBackend::Memory)
    }
}

impl FromStr for IndexBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(IndexBackend::Sqlite),
            "memory" => Ok(IndexBackend::Memory),
            other => anyhow::bail!("Unknown INDEX_BACKEND '{}' (expected sqlite or memory)", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_port: u16,
    pub database_url: String,
    pub index_backend: IndexBackend,
    /// Deadline applied around each search issued through the API
    pub search_timeout: Option<Duration>,
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:mail_index.db".to_string());

        let index_backend = std::env::var("INDEX_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse()?;

        // 0 disables the deadline
        let search_timeout_ms: u64 = std::env::var("SEARCH_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()?;
        let search_timeout = (search_timeout_ms > 0).then(|| Duration::from_millis(search_timeout_ms));

        let seed_demo_data = std::env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        Ok(Config {
            api_port,
            database_url,
            index_backend,
            search_timeout,
            seed_demo_data,
        })
    }
}
