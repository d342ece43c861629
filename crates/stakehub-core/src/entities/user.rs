//! User entity - represents a platform account

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User entity. The password hash is deliberately not part of it and is
/// fetched separately by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub two_factor_enabled: bool,
    #[serde(skip_serializing)]
    pub two_factor_secret: Option<String>,
    pub referral_code: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active, non-admin user
    pub fn new(id: String, email: String, username: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            username,
            is_admin: false,
            is_active: true,
            two_factor_enabled: false,
            two_factor_secret: None,
            referral_code: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a second factor must be supplied at login.
    ///
    /// An account with the flag set but no stored secret cannot be verified,
    /// so it is treated as requiring 2FA as well (verification will fail).
    #[inline]
    pub fn requires_two_factor(&self) -> bool {
        self.two_factor_enabled
    }

    /// Check if the account may use the admin panel
    #[inline]
    pub fn can_access_admin(&self) -> bool {
        self.is_admin && self.is_active
    }
}
