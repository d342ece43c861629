//! Credential and token utilities

mod jwt;
mod password;
mod tokens;
mod totp;

pub use jwt::{parse_ttl, Claims, JwtService, TokenPair, TokenPayload, TokenType};
pub use password::{hash_password, verify_password, PasswordService};
pub use tokens::{generate_random_token, generate_referral_code, generate_session_id, hash_token};
pub use totp::verify_totp;
