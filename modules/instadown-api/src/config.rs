use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres. Absent means records are kept in memory only.
    pub database_url: Option<String>,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Records
    pub record_timezone: String,
    pub record_ttl: Duration,

    // Upstream
    pub instagram_base_url: Option<String>,
    pub instagram_page_size: u32,
    pub instagram_user_agent: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: optional_env("DATABASE_URL"),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parsed_env("API_PORT", 8000)?,
            record_timezone: env::var("RECORD_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Ho_Chi_Minh".to_string()),
            record_ttl: Duration::from_secs(parsed_env::<u64>("RECORD_TTL_HOURS", 24)? * 3600),
            instagram_base_url: optional_env("INSTAGRAM_BASE_URL"),
            instagram_page_size: parsed_env("INSTAGRAM_PAGE_SIZE", 50)?,
            instagram_user_agent: optional_env("INSTAGRAM_USER_AGENT"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
