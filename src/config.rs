// Runtime settings read from the environment
use crate::cache::CacheConfig;
use crate::client::{ClientConfig, RetryConfig};
use crate::types::Credentials;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub agent_id: String,
    pub password: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub cache_max_entries: usize,
    pub search_ttl: Duration,
    pub product_ttl: Duration,
    pub destination_ttl: Duration,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("agent_id", &self.agent_id)
            .field("password", &"[redacted]")
            .field("timeout_ms", &self.timeout_ms)
            .field("retries", &self.retries)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("search_ttl", &self.search_ttl)
            .field("product_ttl", &self.product_ttl)
            .field("destination_ttl", &self.destination_ttl)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load from process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: required(&vars, "TOURPLAN_API_URL", "TOURPLAN_ENDPOINT")?,
            agent_id: required(&vars, "TOURPLAN_AGENT_ID", "TOURPLAN_AGENTID")?,
            password: required(&vars, "TOURPLAN_PASSWORD", "TOURPLAN_AGENTPASSWORD")?,
            timeout_ms: number(&vars, "TOURPLAN_TIMEOUT_MS", 30_000)?,
            retries: number(&vars, "TOURPLAN_RETRIES", 3)?,
            cache_max_entries: number(&vars, "TOURPLAN_CACHE_MAX_ENTRIES", 500)?,
            search_ttl: seconds(&vars, "TOURPLAN_SEARCH_TTL_SECS", 300)?,
            product_ttl: seconds(&vars, "TOURPLAN_PRODUCT_TTL_SECS", 600)?,
            destination_ttl: seconds(&vars, "TOURPLAN_DESTINATION_TTL_SECS", 1800)?,
            port: number(&vars, "PORT", 3000)?,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            credentials: Credentials {
                agent_id: self.agent_id.clone(),
                password: self.password.clone(),
            },
            timeout_ms: self.timeout_ms,
            retry_config: RetryConfig {
                max_attempts: self.retries,
                ..RetryConfig::default()
            },
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.cache_max_entries,
            default_ttl: self.search_ttl,
            ..CacheConfig::default()
        }
    }
}

fn lookup(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    vars: &HashMap<String, String>,
    name: &'static str,
    alias: &str,
) -> Result<String, ConfigError> {
    lookup(vars, name)
        .or_else(|| lookup(vars, alias))
        .ok_or(ConfigError::Missing(name))
}

fn number<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(vars, name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn seconds(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    number(vars, name, default).map(Duration::from_secs)
}
