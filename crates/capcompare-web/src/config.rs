use capcompare_core::DEFAULT_SERIES_CAPACITY;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CAPCOMPARE_FMP_API_KEY is not set")]
    MissingApiKey,
    #[error("CAPCOMPARE_CACHE_CAPACITY is not a number: {value}")]
    InvalidCacheCapacity { value: String },
}

/// Process configuration, read once at startup. The API key is required;
/// everything else has a default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub bind_addr: String,
    pub base_url: Option<String>,
    pub cache_capacity: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("CAPCOMPARE_FMP_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let bind_addr = std::env::var("CAPCOMPARE_BIND_ADDR")
            .unwrap_or_else(|_| String::from(DEFAULT_BIND_ADDR));
        let base_url = std::env::var("CAPCOMPARE_FMP_BASE_URL").ok();
        let cache_capacity = match std::env::var("CAPCOMPARE_CACHE_CAPACITY") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidCacheCapacity { value: raw })?,
            Err(_) => DEFAULT_SERIES_CAPACITY,
        };
        Ok(Self {
            api_key,
            bind_addr,
            base_url,
            cache_capacity,
        })
    }
}
