//! Sequential referral codes

use rand::Rng;
use tracing::{instrument, warn};

use stakehub_core::entities::{format_referral_code, USER_REFERRAL_COUNTER};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct ReferralService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReferralService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Next code from the shared counter, e.g. `SH000042`.
    ///
    /// The counter is incremented under a row lock, so concurrent callers
    /// never receive the same value. A code that collides with one assigned
    /// outside the counter gets a random hex suffix.
    ///
    /// # Errors
    /// Propagates counter failures
    #[instrument(skip(self))]
    pub async fn get_next_referral_code(&self) -> ServiceResult<String> {
        let value = self.ctx.referral_repo().next_value(USER_REFERRAL_COUNTER).await?;
        let code = format_referral_code(value);

        if !self.ctx.user_repo().referral_code_exists(&code).await? {
            return Ok(code);
        }

        let suffix: u16 = rand::thread_rng().gen_range(0..0x1000);
        let code = format!("{code}{suffix:03X}");
        warn!(%code, "Referral code collision, using suffixed code");
        Ok(code)
    }
}
