use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;
use crate::importers::DEFAULT_HEADER_ROWS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DATA_BASE_URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub data_base_url: Option<Url>,
    pub header_rows: usize,
    pub prediction_delay_ms: u64,
    pub noise_seed: Option<u64>,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            data_dir: PathBuf::from("data"),
            data_base_url: None,
            header_rows: DEFAULT_HEADER_ROWS,
            prediction_delay_ms: 1500,
            noise_seed: None,
            http_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            data_base_url: match env::var("DATA_BASE_URL") {
                Ok(url) if !url.trim().is_empty() => Some(parse_base_url(&url)?),
                _ => None,
            },
            header_rows: env::var("HEADER_ROWS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.header_rows),
            prediction_delay_ms: env::var("PREDICTION_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.prediction_delay_ms),
            noise_seed: env::var("NOISE_SEED").ok().and_then(|v| v.parse().ok()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn prediction_delay(&self) -> Duration {
        Duration::from_millis(self.prediction_delay_ms)
    }

    /// Remote base URL when configured, otherwise the local data directory
    pub fn resource_fetcher(&self) -> Result<ResourceFetcher, FetchError> {
        match &self.data_base_url {
            Some(url) => ResourceFetcher::remote(url.clone(), Duration::from_secs(self.http_timeout_secs)),
            None => Ok(ResourceFetcher::directory(self.data_dir.clone())),
        }
    }
}

/// Parse a base URL, making sure it ends with '/' so file names are appended
/// rather than replacing the last path segment
pub fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let trimmed = url.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let parsed = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "cannot be a base URL".to_string(),
        });
    }
    Ok(parsed)
}
