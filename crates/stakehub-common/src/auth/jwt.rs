//! JWT utilities for authentication
//!
//! Access and refresh tokens are signed with distinct secrets. A missing
//! secret is not detected at startup; it surfaces as `AppError::Config`
//! the first time a token of that kind is issued or decoded.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Identity carried inside a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
    pub session_id: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Session the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// The subject, if the token carries a usable one
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        let sub = self.sub.trim();
        (!sub.is_empty()).then_some(sub)
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    #[must_use]
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    #[must_use]
    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }

    /// Identity portion of the claims, for re-issuing tokens
    #[must_use]
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            session_id: self.session_id.clone(),
        }
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    access: Option<SigningKeys>,
    refresh: Option<SigningKeys>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    /// Create a JWT service. Either secret may be absent.
    ///
    /// # Errors
    /// Returns a configuration error if a TTL string cannot be parsed or is too long
    pub fn new(
        access_secret: Option<&str>,
        refresh_secret: Option<&str>,
        access_ttl: &str,
        refresh_ttl: &str,
    ) -> Result<Self, AppError> {
        Ok(Self {
            access: access_secret.map(SigningKeys::from_secret),
            refresh: refresh_secret.map(SigningKeys::from_secret),
            access_ttl: parse_ttl(access_ttl)?,
            refresh_ttl: parse_ttl(refresh_ttl)?,
        })
    }

    /// Create a JWT service from configuration
    ///
    /// # Errors
    /// Returns a configuration error if a TTL string cannot be parsed or is too long
    pub fn from_config(config: &JwtConfig) -> Result<Self, AppError> {
        Self::new(
            config.secret.as_deref(),
            config.refresh_secret.as_deref(),
            &config.expires_in,
            &config.refresh_expires_in,
        )
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access token with the configured lifetime
    ///
    /// # Errors
    /// Returns `AppError::Config` if `JWT_SECRET` is not set
    pub fn generate_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        self.encode_token(payload, TokenType::Access, self.access_ttl)
    }

    /// Issue an access token with an explicit lifetime such as `"15m"`
    ///
    /// # Errors
    /// Returns an error if the secret is missing or the TTL is malformed
    pub fn generate_token_with_ttl(
        &self,
        payload: &TokenPayload,
        ttl: &str,
    ) -> Result<String, AppError> {
        self.encode_token(payload, TokenType::Access, parse_ttl(ttl)?)
    }

    /// Issue a refresh token with the configured lifetime
    ///
    /// # Errors
    /// Returns `AppError::Config` if `JWT_REFRESH_SECRET` is not set
    pub fn generate_refresh_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        self.encode_token(payload, TokenType::Refresh, self.refresh_ttl)
    }

    /// Issue a refresh token with an explicit lifetime
    ///
    /// # Errors
    /// Returns an error if the secret is missing or the TTL is malformed
    pub fn generate_refresh_token_with_ttl(
        &self,
        payload: &TokenPayload,
        ttl: &str,
    ) -> Result<String, AppError> {
        self.encode_token(payload, TokenType::Refresh, parse_ttl(ttl)?)
    }

    /// Issue both tokens for a login
    ///
    /// # Errors
    /// Returns an error if either secret is missing
    pub fn generate_token_pair(&self, payload: &TokenPayload) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.generate_token(payload)?,
            refresh_token: self.generate_refresh_token(payload)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    fn keys(&self, token_type: TokenType) -> Result<&SigningKeys, AppError> {
        match token_type {
            TokenType::Access => self
                .access
                .as_ref()
                .ok_or_else(|| AppError::Config("JWT_SECRET is not configured".to_string())),
            TokenType::Refresh => self.refresh.as_ref().ok_or_else(|| {
                AppError::Config("JWT_REFRESH_SECRET is not configured".to_string())
            }),
        }
    }

    fn encode_token(
        &self,
        payload: &TokenPayload,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let keys = self.keys(token_type)?;
        let now = Utc::now();

        let claims = Claims {
            sub: payload.user_id.clone(),
            email: payload.email.clone(),
            is_admin: payload.is_admin,
            session_id: payload.session_id.clone(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .ok_or_else(|| AppError::Config(format!("Token lifetime out of range: {ttl}")))?
                .timestamp(),
            token_type,
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    fn decode_as(&self, token: &str, token_type: TokenType) -> Result<Claims, AppError> {
        let keys = self.keys(token_type)?;
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        if token_data.claims.token_type != token_type {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    /// Decode and validate an access token, keeping the failure kind
    ///
    /// # Errors
    /// `TokenExpired`, `InvalidToken`, or `Config` when the secret is missing
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_as(token, TokenType::Access)
    }

    /// Decode and validate a refresh token, keeping the failure kind
    ///
    /// # Errors
    /// `TokenExpired`, `InvalidToken`, or `Config` when the secret is missing
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_as(token, TokenType::Refresh)
    }

    /// Verify an access token. Any failure yields `None`.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        self.decode_token(token)
            .map_err(|e| tracing::debug!(error = %e, "Access token rejected"))
            .ok()
    }

    /// Verify a refresh token. Any failure yields `None`.
    #[must_use]
    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        self.decode_refresh_token(token)
            .map_err(|e| tracing::debug!(error = %e, "Refresh token rejected"))
            .ok()
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_configured", &self.access.is_some())
            .field("refresh_configured", &self.refresh.is_some())
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// Longest token lifetime accepted from configuration
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Parse a lifetime such as `"24h"`, `"7d"`, `"15m"`, `"30s"` or a bare
/// number of seconds.
///
/// # Errors
/// Returns `AppError::Config` for anything else, or for a lifetime longer
/// than [`MAX_TOKEN_TTL_DAYS`]
pub fn parse_ttl(ttl: &str) -> Result<Duration, AppError> {
    let ttl = ttl.trim();
    let invalid = || AppError::Config(format!("Invalid token lifetime: {ttl:?}"));

    let (digits, unit) = match ttl.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&ttl[..idx], Some(c)),
        Some(_) => (ttl, None),
        None => return Err(invalid()),
    };

    let value: i64 = digits.parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }

    let duration = match unit {
        None | Some('s') => Duration::try_seconds(value),
        Some('m') => Duration::try_minutes(value),
        Some('h') => Duration::try_hours(value),
        Some('d') => Duration::try_days(value),
        Some(_) => return Err(invalid()),
    };

    match duration {
        Some(d) if d <= Duration::days(MAX_TOKEN_TTL_DAYS) => Ok(d),
        _ => Err(AppError::Config(format!(
            "Token lifetime {ttl:?} exceeds {MAX_TOKEN_TTL_DAYS} days"
        ))),
    }
}
