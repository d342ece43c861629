//! Trading bot activation entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotType {
    Basic,
    Pro,
    Elite,
}

impl BotType {
    pub const ALL: [BotType; 3] = [BotType::Basic, BotType::Pro, BotType::Elite];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Pro => "PRO",
            Self::Elite => "ELITE",
        }
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BASIC" => Ok(Self::Basic),
            "PRO" => Ok(Self::Pro),
            "ELITE" => Ok(Self::Elite),
            other => Err(DomainError::ValidationError(format!(
                "Unknown bot type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotActivation {
    pub id: String,
    pub user_id: String,
    pub bot_type: BotType,
    pub is_active: bool,
    pub activated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl BotActivation {
    /// Active and not past its expiry
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |exp| exp > now)
    }
}
