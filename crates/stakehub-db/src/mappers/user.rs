//! User model -> entity mapper

use stakehub_core::entities::User;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            email: model.email,
            username: model.username,
            is_admin: model.is_admin,
            is_active: model.is_active,
            two_factor_enabled: model.two_factor_enabled,
            two_factor_secret: model.two_factor_secret,
            referral_code: model.referral_code,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
