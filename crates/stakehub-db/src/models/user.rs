//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table (password excluded)
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub two_factor_enabled: bool,
    pub two_factor_secret: Option<String>,
    pub referral_code: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list matching [`UserModel`]
pub(crate) const USER_COLUMNS: &str = "id, email, username, is_admin, is_active, \
    two_factor_enabled, two_factor_secret, referral_code, last_login_at, created_at, updated_at";
