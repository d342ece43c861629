//! Referral counter constants

/// Counter row backing user referral codes
pub const USER_REFERRAL_COUNTER: &str = "USER_REFERRAL";

/// Render a counter value as a referral code: `SH` followed by the value
/// zero-padded to at least six digits.
pub fn format_referral_code(value: i64) -> String {
    format!("SH{value:06}")
}
