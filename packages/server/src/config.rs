use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use asset_extract::{ExtractorConfig, DEFAULT_BASE_URL};
use dotenvy::dotenv;
use gemini_client::DEFAULT_MODEL;

/// What to do when market data for an asset cannot be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Reject the request with 422 and ask the user to confirm the ticker.
    #[default]
    Abort,
    /// Continue and let the prompt mark the data as unavailable ("N/D").
    Degrade,
}

impl FromStr for FetchFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "degrade" => Ok(Self::Degrade),
            other => bail!("unknown fetch failure policy {:?} (expected abort or degrade)", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub data_site_base_url: String,
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
    pub fetch_failure_policy: FetchFailurePolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            data_site_base_url: var("DATA_SITE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fetch_timeout: Duration::from_millis(
                var("FETCH_TIMEOUT_MS")
                    .unwrap_or_else(|| "12000".to_string())
                    .parse()
                    .context("FETCH_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            model_timeout: Duration::from_secs(
                var("MODEL_TIMEOUT_SECS")
                    .unwrap_or_else(|| "45".to_string())
                    .parse()
                    .context("MODEL_TIMEOUT_SECS must be a number of seconds")?,
            ),
            fetch_failure_policy: var("FETCH_FAILURE_POLICY")
                .map(|value| value.parse())
                .transpose()
                .context("FETCH_FAILURE_POLICY must be abort or degrade")?
                .unwrap_or_default(),
        })
    }

    /// Extractor settings derived from this configuration.
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::new()
            .with_base_url(self.data_site_base_url.clone())
            .with_timeout(self.fetch_timeout)
    }
}
