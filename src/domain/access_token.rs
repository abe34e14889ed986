use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-use entry pass rendered as a QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: Uuid,
    pub member_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

/// Outcome of presenting a token at the door.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Granted,
    AlreadyUsed,
    Invalid,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    pub fn message(&self) -> &'static str {
        match self {
            AccessDecision::Granted => "Access granted",
            AccessDecision::AlreadyUsed => "This QR code has already been used",
            AccessDecision::Invalid => "This QR code is not valid",
        }
    }
}

/// Result of the conditional `used = 0 -> 1` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeResult {
    Consumed,
    AlreadyUsed,
    NotFound,
}
