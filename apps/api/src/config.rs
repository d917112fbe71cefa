use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Optional OCR collaborator endpoint for scanned PDFs. Extraction
    /// simply skips the fallback when unset.
    pub ocr_endpoint: Option<String>,
    /// Below this many extracted characters we try the OCR fallback.
    pub min_extract_chars: usize,
    /// Below this many characters (after fallback) the upload is rejected.
    pub extract_floor_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            ocr_endpoint: std::env::var("OCR_ENDPOINT").ok(),
            min_extract_chars: parse_env("MIN_EXTRACT_CHARS", 180)?,
            extract_floor_chars: parse_env("EXTRACT_FLOOR_CHARS", 40)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer")),
        Err(_) => Ok(default),
    }
}
