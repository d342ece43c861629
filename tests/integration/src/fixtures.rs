//! Test fixtures and data generators

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use stakehub_common::{hash_password, AppConfig, Claims, JwtService, TokenType};
use stakehub_core::entities::{BotActivation, BotType, User};
use totp_rs::{Algorithm, Secret, TOTP};

pub const TEST_JWT_SECRET: &str = "integration-access-secret";
pub const TEST_JWT_REFRESH_SECRET: &str = "integration-refresh-secret";
pub const TEST_PASSWORD: &str = "CorrectHorse9!";
/// Base32 secret for 2FA-enabled accounts
pub const TEST_TOTP_SECRET: &str = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}{}-{}@stakehub.test", unique_suffix(), uuid::Uuid::new_v4().simple())
}

/// JWT service with fixed test secrets
pub fn test_jwt() -> JwtService {
    JwtService::new(
        Some(TEST_JWT_SECRET),
        Some(TEST_JWT_REFRESH_SECRET),
        "24h",
        "7d",
    )
    .expect("valid test TTLs")
}

/// Configuration that needs no environment
pub fn memory_config() -> AppConfig {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://unused@localhost/unused"),
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("JWT_REFRESH_SECRET", TEST_JWT_REFRESH_SECRET),
        ("APP_ENV", "development"),
        ("ALLOWED_ORIGINS", "http://localhost:3000"),
        ("RATE_LIMIT_BURST", "1000"),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
    ]
    .into_iter()
    .collect();

    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
        .expect("test configuration")
}

/// Argon2 hash of [`TEST_PASSWORD`]
pub fn test_password_hash() -> String {
    hash_password(TEST_PASSWORD).expect("hash test password")
}

/// Active admin without 2FA
pub fn admin_user(email: &str) -> User {
    let mut user = User::new(
        format!("admin-{}", unique_suffix()),
        email.to_string(),
        "admin".to_string(),
    );
    user.is_admin = true;
    user
}

/// Active non-admin user
pub fn regular_user(email: &str) -> User {
    User::new(
        format!("user-{}", unique_suffix()),
        email.to_string(),
        "trader".to_string(),
    )
}

pub fn bot_activation(
    user_id: &str,
    bot_type: BotType,
    expires_in: Option<Duration>,
) -> BotActivation {
    BotActivation {
        id: format!("bot-{}", unique_suffix()),
        user_id: user_id.to_string(),
        bot_type,
        is_active: true,
        activated_at: Utc::now() - Duration::days(1),
        expires_at: expires_in.map(|d| Utc::now() + d),
    }
}

/// Access token signed with the test secret that expired an hour ago
pub fn expired_access_token(user_id: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: "expired@stakehub.test".to_string(),
        is_admin: true,
        session_id: None,
        iat: (now - Duration::hours(25)).timestamp(),
        exp: (now - Duration::hours(1)).timestamp(),
        token_type: TokenType::Access,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode expired token")
}

/// Code an authenticator would show right now for [`TEST_TOTP_SECRET`]
pub fn current_totp_code() -> String {
    let secret = Secret::Encoded(TEST_TOTP_SECRET.to_string())
        .to_bytes()
        .expect("valid base32");
    TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, secret, None, String::new())
        .generate_current()
        .expect("system time")
}

/// Admin with 2FA enabled on [`TEST_TOTP_SECRET`]
pub fn two_factor_admin(email: &str) -> User {
    let mut user = admin_user(email);
    user.two_factor_enabled = true;
    user.two_factor_secret = Some(TEST_TOTP_SECRET.to_string());
    user
}
