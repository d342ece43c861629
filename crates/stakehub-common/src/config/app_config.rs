//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// Value of `NEXT_PHASE`, set by the frontend build tooling
    #[serde(default)]
    pub build_phase: Option<String>,
}

impl AppSettings {
    /// Whether the process runs as part of a build step rather than serving traffic
    #[must_use]
    pub fn is_build_phase(&self) -> bool {
        self.build_phase
            .as_deref()
            .is_some_and(|phase| phase.contains("build"))
    }
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
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    /// Server-side `statement_timeout` for every pooled connection
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
    /// Client-side deadline used by the timed query helpers
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// Verify the server certificate for self-hosted databases
    #[serde(default)]
    pub ssl_reject_unauthorized: bool,
    #[serde(default)]
    pub verbose_logs: bool,
}

/// JWT configuration
///
/// Secrets are optional at load time. Issuing or verifying a token without
/// the matching secret is reported as a configuration error at call time.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub refresh_secret: Option<String>,
    #[serde(default = "default_access_token_ttl")]
    pub expires_in: String,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_expires_in: String,
}

/// Login security and admission control
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: i64,
    #[serde(default = "default_max_ip_attempts")]
    pub max_ip_attempts: i64,
    #[serde(default = "default_login_window_minutes")]
    pub login_window_minutes: i64,
    #[serde(default = "default_admission_capacity")]
    pub admission_capacity: usize,
    #[serde(default = "default_admission_max_wait_ms")]
    pub admission_max_wait_ms: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            max_ip_attempts: default_max_ip_attempts(),
            login_window_minutes: default_login_window_minutes(),
            admission_capacity: default_admission_capacity(),
            admission_max_wait_ms: default_admission_max_wait_ms(),
        }
    }
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

impl CorsConfig {
    /// The single origin allowed to make credentialed requests
    #[must_use]
    pub fn primary_origin(&self) -> &str {
        self.allowed_origins
            .iter()
            .map(String::as_str)
            .find(|o| !o.is_empty())
            .unwrap_or(DEFAULT_ORIGIN)
    }
}

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

// Default value functions
fn default_app_name() -> String {
    "stakehub".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    3001
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_idle_timeout_secs() -> u64 {
    30
}

fn default_max_lifetime_secs() -> u64 {
    1800
}

fn default_statement_timeout_ms() -> u64 {
    30_000
}

fn default_query_timeout_ms() -> u64 {
    30_000
}

fn default_access_token_ttl() -> String {
    "24h".to_string()
}

fn default_refresh_token_ttl() -> String {
    "7d".to_string()
}

fn default_max_login_attempts() -> i64 {
    5
}

fn default_max_ip_attempts() -> i64 {
    default_max_login_attempts() * 2
}

fn default_login_window_minutes() -> i64 {
    15
}

fn default_admission_capacity() -> usize {
    1
}

fn default_admission_max_wait_ms() -> u64 {
    10_000
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            get(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, v))
                })
                .transpose()
        };
        let flag = |key: &str| {
            get(key).is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
        };

        let max_login_attempts = parse("LOGIN_MAX_ATTEMPTS")?
            .map_or_else(default_max_login_attempts, |v| v as i64);

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env: get("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
                build_phase: get("NEXT_PHASE"),
            },
            api: ServerConfig {
                host: get("API_HOST").unwrap_or_else(default_host),
                port: parse("API_PORT")?.map_or_else(default_api_port, |v| v as u16),
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse("DATABASE_MAX_CONNECTIONS")?
                    .map_or_else(default_max_connections, |v| v as u32),
                min_connections: parse("DATABASE_MIN_CONNECTIONS")?
                    .map_or_else(default_min_connections, |v| v as u32),
                acquire_timeout_secs: parse("DATABASE_ACQUIRE_TIMEOUT_SECS")?
                    .unwrap_or_else(default_acquire_timeout_secs),
                idle_timeout_secs: parse("DATABASE_IDLE_TIMEOUT_SECS")?
                    .unwrap_or_else(default_idle_timeout_secs),
                max_lifetime_secs: parse("DATABASE_MAX_LIFETIME_SECS")?
                    .unwrap_or_else(default_max_lifetime_secs),
                statement_timeout_ms: parse("DATABASE_STATEMENT_TIMEOUT_MS")?
                    .unwrap_or_else(default_statement_timeout_ms),
                query_timeout_ms: parse("DATABASE_QUERY_TIMEOUT_MS")?
                    .unwrap_or_else(default_query_timeout_ms),
                ssl_reject_unauthorized: flag("DB_SSL_REJECT_UNAUTHORIZED"),
                verbose_logs: flag("VERBOSE_DB_LOGS"),
            },
            jwt: JwtConfig {
                secret: get("JWT_SECRET").filter(|s| !s.is_empty()),
                refresh_secret: get("JWT_REFRESH_SECRET").filter(|s| !s.is_empty()),
                expires_in: get("JWT_EXPIRES_IN").unwrap_or_else(default_access_token_ttl),
                refresh_expires_in: get("JWT_REFRESH_EXPIRES_IN")
                    .unwrap_or_else(default_refresh_token_ttl),
            },
            security: SecurityConfig {
                max_login_attempts,
                max_ip_attempts: parse("LOGIN_MAX_IP_ATTEMPTS")?
                    .map_or(max_login_attempts * 2, |v| v as i64),
                login_window_minutes: parse("LOGIN_WINDOW_MINUTES")?
                    .map_or_else(default_login_window_minutes, |v| v as i64),
                admission_capacity: parse("ADMISSION_CAPACITY")?
                    .map_or_else(default_admission_capacity, |v| (v as usize).max(1)),
                admission_max_wait_ms: parse("ADMISSION_MAX_WAIT_MS")?
                    .unwrap_or_else(default_admission_max_wait_ms),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .map_or_else(default_requests_per_second, |v| v as u32),
                burst: parse("RATE_LIMIT_BURST")?.map_or_else(default_burst, |v| v as u32),
            },
            cors: CorsConfig {
                allowed_origins: get("ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
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
