//! Runtime configuration

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Connection details for the hosted backend
#[derive(Clone)]
pub struct BackendSettings {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Hosted backend; the in-memory demo backend is used when unset
    pub backend: Option<BackendSettings>,
    pub http_timeout: Duration,
    /// Where command results are written as JSON
    pub output_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: None,
            http_timeout: Duration::from_secs(30),
            output_path: PathBuf::from("rental_market_output.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = var("RENTAL_SUPABASE_URL") {
            let api_key = var("RENTAL_SUPABASE_KEY")
                .context("RENTAL_SUPABASE_KEY must be set when RENTAL_SUPABASE_URL is")?;
            cfg.backend = Some(BackendSettings { url, api_key });
        }

        if let Some(secs) = var("RENTAL_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid RENTAL_HTTP_TIMEOUT_SECS: {}", secs))?;
            cfg.http_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = var("RENTAL_OUTPUT_PATH") {
            cfg.output_path = PathBuf::from(path);
        }

        Ok(cfg)
    }
}
