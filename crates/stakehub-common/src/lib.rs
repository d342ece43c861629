//! # stakehub-common
//!
//! Shared utilities including configuration, error handling, credentials, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_random_token, generate_referral_code, generate_session_id, hash_password,
    hash_token, parse_ttl, verify_password, verify_totp, Claims, JwtService, PasswordService,
    TokenPair, TokenPayload, TokenType,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    RateLimitConfig, SecurityConfig, ServerConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
