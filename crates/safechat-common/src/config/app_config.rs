//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use safechat_core::Snowflake;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub moderation: ModerationConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration. Without a URL the server runs on the in-process store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration (tokens are issued by the external auth provider)
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Moderation pipeline and fixed system identities
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Account children can always reach; sends counseling notices
    pub counselor_account_id: Snowflake,
    /// Recorded as the flagger on automatic flags
    pub system_flagger_id: Snowflake,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Jobs the worker runs at once; further jobs wait in the queue
    #[serde(default = "default_max_concurrent_scans")]
    pub max_concurrent_scans: usize,
    /// External image scanner endpoint; `None` disables the image branch
    #[serde(default)]
    pub image_scanner_url: Option<String>,
    #[serde(default = "default_scanner_timeout")]
    pub image_scanner_timeout_secs: u64,
    /// JSON keyword list; `None` uses the built-in list
    #[serde(default)]
    pub keyword_list_path: Option<String>,
    #[serde(default = "default_counselor_message")]
    pub counselor_message: String,
    /// Shared secret for the internal scan endpoints; `None` disables them
    #[serde(default)]
    pub internal_api_key: Option<String>,
}

// Default value functions
fn default_app_name() -> String {
    "safechat".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_concurrent_scans() -> usize {
    16
}

fn default_scanner_timeout() -> u64 {
    10
}

fn default_counselor_message() -> String {
    "Hi, it's the counselor. Something in your recent message made us want to check in. \
     Are you okay? You can talk to me here any time."
        .to_string()
}

/// Read a variable, treating blank values as unset
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional variable; present but unparseable is an error
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(name, raw))
        })
        .transpose()
}

fn require_var<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    parse_var(name)?.ok_or(ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: var("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: var("API_HOST").unwrap_or_else(default_host),
                port: require_var("API_PORT")?,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            jwt: JwtConfig {
                secret: var("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_var("JWT_ACCESS_TOKEN_EXPIRY")?
                    .unwrap_or_else(default_access_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: parse_var("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_var("WORKER_ID")?.unwrap_or(0),
            },
            moderation: ModerationConfig {
                counselor_account_id: require_var("COUNSELOR_ACCOUNT_ID")?,
                system_flagger_id: require_var("SYSTEM_FLAGGER_ID")?,
                queue_capacity: parse_var("MODERATION_QUEUE_CAPACITY")?
                    .unwrap_or_else(default_queue_capacity),
                max_concurrent_scans: parse_var("MODERATION_MAX_CONCURRENT_SCANS")?
                    .unwrap_or_else(default_max_concurrent_scans),
                image_scanner_url: var("IMAGE_SCANNER_URL"),
                image_scanner_timeout_secs: parse_var("IMAGE_SCANNER_TIMEOUT_SECS")?
                    .unwrap_or_else(default_scanner_timeout),
                keyword_list_path: var("KEYWORD_LIST_PATH"),
                counselor_message: var("COUNSELOR_MESSAGE")
                    .unwrap_or_else(default_counselor_message),
                internal_api_key: var("INTERNAL_API_KEY"),
            },
        })
    }
}

impl ModerationConfig {
    /// Defaults for everything but the two fixed identities
    pub fn new(counselor_account_id: Snowflake, system_flagger_id: Snowflake) -> Self {
        Self {
            counselor_account_id,
            system_flagger_id,
            queue_capacity: default_queue_capacity(),
            max_concurrent_scans: default_max_concurrent_scans(),
            image_scanner_url: None,
            image_scanner_timeout_secs: default_scanner_timeout(),
            keyword_list_path: None,
            counselor_message: default_counselor_message(),
            internal_api_key: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("PRODUCTION"), Some(Environment::Production));
        assert_eq!(Environment::parse("staging"), Some(Environment::Staging));
        assert_eq!(Environment::parse("qa"), None);
        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("SAFECHAT_TEST_QUEUE", "lots");
        let err = parse_var::<usize>("SAFECHAT_TEST_QUEUE").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("SAFECHAT_TEST_QUEUE", _)));

        env::set_var("SAFECHAT_TEST_QUEUE", " 64 ");
        assert_eq!(parse_var::<usize>("SAFECHAT_TEST_QUEUE").unwrap(), Some(64));

        env::set_var("SAFECHAT_TEST_QUEUE", "   ");
        assert_eq!(parse_var::<usize>("SAFECHAT_TEST_QUEUE").unwrap(), None);
        env::remove_var("SAFECHAT_TEST_QUEUE");
    }

    #[test]
    fn test_require_var_missing() {
        let err = require_var::<u16>("SAFECHAT_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("SAFECHAT_TEST_DEFINITELY_UNSET")));
    }

    #[test]
    fn test_moderation_defaults() {
        let config = ModerationConfig::new(Snowflake::new(1), Snowflake::new(2));
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.max_concurrent_scans, 16);
        assert!(config.image_scanner_url.is_none());
        assert!(config.internal_api_key.is_none());
        assert!(!config.counselor_message.is_empty());
    }
}
