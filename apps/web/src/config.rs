use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;

/// Application configuration loaded from environment variables.
/// Fails at startup if the API origin is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the PulseLoop API; the only required setting.
    pub api_url: Url,
    pub api_token: Option<String>,
    pub api_timeout: Duration,
    pub organization_id: String,
    pub quiz_session_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: parse_api_url(&require_env("PULSELOOP_API_URL")?)?,
            api_token: std::env::var("PULSELOOP_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            api_timeout: Duration::from_secs(parse_env("API_TIMEOUT_SECS", 15)?),
            organization_id: std::env::var("ORGANIZATION_ID")
                .unwrap_or_else(|_| "org_placeholder_id".to_string()),
            quiz_session_ttl: Duration::from_secs(parse_env("QUIZ_SESSION_TTL_SECS", 1800)?),
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// The base URL must be an absolute http(s) URL. A trailing slash is implied.
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("Invalid API URL '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API URL must use http or https, got '{}'", url.scheme());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
