use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000,http://127.0.0.1:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Budget for one fixed-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub message: &'static str,
}

impl RateLimitConfig {
    /// 100 requests per 15 minutes, applied to every API route.
    pub fn general() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            message: "Too many requests from this IP, please try again later.",
        }
    }

    /// 30 requests per minute, applied on top of `general` for search routes.
    pub fn search() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 30,
            message: "Too many searches, please wait a moment.",
        }
    }
}

/// Per-route cache lifetimes.
#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub search: Duration,
    pub author: Duration,
    pub category: Duration,
    pub isbn: Duration,
    pub book: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(600),
            author: Duration::from_secs(900),
            category: Duration::from_secs(900),
            isbn: Duration::from_secs(1800),
            book: Duration::from_secs(1800),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub books_api_url: String,
    pub books_api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub trust_proxy: bool,
    pub cache_check_period: Duration,
    pub cache_ttls: CacheTtls,
    pub general_limit: RateLimitConfig,
    pub search_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
            books_api_url: DEFAULT_BOOKS_API_URL.to_string(),
            books_api_key: None,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            trust_proxy: false,
            cache_check_period: Duration::from_secs(120),
            cache_ttls: CacheTtls::default(),
            general_limit: RateLimitConfig::general(),
            search_limit: RateLimitConfig::search(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value })?,
            None => defaults.port,
        };

        let environment = lookup("NODE_ENV")
            .or_else(|| lookup("APP_ENV"))
            .map(|value| Environment::parse(&value))
            .unwrap_or(defaults.environment);

        let books_api_url = lookup("GOOGLE_BOOKS_API_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.books_api_url);

        let books_api_key = lookup("GOOGLE_BOOKS_API_KEY").filter(|key| !key.trim().is_empty());

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|value| split_origins(&value))
            .unwrap_or(defaults.allowed_origins);

        let trust_proxy = lookup("TRUST_PROXY")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cache_check_period = match lookup("CACHE_CHECK_PERIOD_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "CACHE_CHECK_PERIOD_SECS",
                        value,
                    })
                }
            },
            None => defaults.cache_check_period,
        };

        Ok(Self {
            port,
            environment,
            books_api_url,
            books_api_key,
            allowed_origins,
            trust_proxy,
            cache_check_period,
            ..defaults
        })
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.to_string())
        .collect()
}
