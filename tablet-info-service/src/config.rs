use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_WHO_CSV_PATH: &str = "who_essential_medicines.csv";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_RXNORM_BASE_URL: &str = "https://rxnav.nlm.nih.gov/REST";
pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";
pub const DEFAULT_TTS_LANG: &str = "en";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
}

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub port: u16,
    pub who_csv_path: PathBuf,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub rxnorm_base_url: String,
    pub tts_base_url: String,
    pub tts_lang: String,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("GOOGLE_API_KEY"))?;

        Ok(Self {
            google_api_key,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            who_csv_path: PathBuf::from(var("WHO_CSV_PATH", DEFAULT_WHO_CSV_PATH)),
            gemini_base_url: trim_slash(var("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)),
            gemini_model: var("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            rxnorm_base_url: trim_slash(var("RXNORM_BASE_URL", DEFAULT_RXNORM_BASE_URL)),
            tts_base_url: trim_slash(var("TTS_BASE_URL", DEFAULT_TTS_BASE_URL)),
            tts_lang: var("TTS_LANG", DEFAULT_TTS_LANG),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
