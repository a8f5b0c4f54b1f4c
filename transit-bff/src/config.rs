//! Environment-driven server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::chat::LlmConfig;
use crate::stops::FeedConfig;

/// Default listen port.
const DEFAULT_PORT: u16 = 8001;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` was set but is not a valid port number
    #[error("invalid PORT {value:?}: {message}")]
    InvalidPort { value: String, message: String },

    /// `HOST` was set but is not an IP address
    #[error("invalid HOST {value:?}: {message}")]
    InvalidHost { value: String, message: String },
}

/// Which origins the CORS layer admits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin (`*`).
    #[default]
    Any,
    /// An explicit list of origins.
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated origin list. A `*` entry anywhere admits all origins.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

/// Top-level configuration for the BFF.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// CORS origins
    pub allowed_origins: AllowedOrigins,
    /// Where stop data comes from
    pub feed: FeedConfig,
    /// LLM endpoint credentials
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Unset and empty variables both fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidPort {
                    message: e.to_string(),
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        let host = match var("HOST") {
            Some(value) => value
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| ConfigError::InvalidHost {
                    message: e.to_string(),
                    value,
                })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| AllowedOrigins::parse(&raw))
            .unwrap_or_default();

        let mut feed = FeedConfig::default();
        if let Some(path) = var("GTFS_STOPS_PATH") {
            feed = feed.with_local_path(path);
        }
        if let Some(url) = var("GTFS_SWEDEN3_STATIC_URL") {
            feed = feed.with_remote_url(url);
        }
        if let Some(key) = var("GTFS_SWEDEN3_STATIC_KEY") {
            feed = feed.with_api_key(key);
        }

        let llm = LlmConfig::new(
            var("AZURE_OPENAI_ENDPOINT").unwrap_or_default(),
            var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_default(),
            var("AZURE_OPENAI_API_VERSION").unwrap_or_default(),
            var("AZURE_OPENAI_API_KEY").unwrap_or_default(),
        );

        Ok(Self {
            addr: SocketAddr::new(host, port),
            allowed_origins,
            feed,
            llm,
        })
    }
}
