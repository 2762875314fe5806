use std::{fmt, str::FromStr};

use crate::interfaces::ledger::RewardTransfer;

pub const FRESHNESS_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Reward units issued to the participant on every check-in.
pub const PARTICIPANT_REWARD: u64 = 4;
/// Reward units issued to the operator account on every check-in.
pub const OPERATOR_REWARD: u64 = 1;

const SEPARATOR: char = '-';

/// Scan token `"<alias>-<epoch-millis>"`. The alias may contain the separator, the
/// timestamp is always after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInToken {
    pub alias: String,
    pub issued_at_ms: i64,
}

impl CheckInToken {
    pub fn new(alias: &str, issued_at_ms: i64) -> Self {
        Self {
            alias: alias.to_string(),
            issued_at_ms,
        }
    }

    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.issued_at_ms)
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.elapsed_ms(now_ms) > FRESHNESS_WINDOW_MS
    }

    /// Clock skew tolerance mirrors the freshness window.
    pub fn is_from_future_at(&self, now_ms: i64) -> bool {
        self.elapsed_ms(now_ms) < -FRESHNESS_WINDOW_MS
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.issued_at_ms.saturating_add(FRESHNESS_WINDOW_MS)
    }
}

impl FromStr for CheckInToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (alias, timestamp) = s
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| "token has no timestamp separator".to_string())?;
        if alias.is_empty() {
            return Err("token alias is empty".to_string());
        }
        let issued_at_ms = timestamp
            .parse::<i64>()
            .map_err(|e| format!("token timestamp {timestamp:?} is not an integer: {e}"))?;
        Ok(CheckInToken::new(alias, issued_at_ms))
    }
}

impl fmt::Display for CheckInToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.alias, self.issued_at_ms)
    }
}

pub fn reward_split(participant: &str, operator: &str) -> [RewardTransfer; 2] {
    [
        RewardTransfer {
            recipient: participant.to_string(),
            amount: PARTICIPANT_REWARD,
        },
        RewardTransfer {
            recipient: operator.to_string(),
            amount: OPERATOR_REWARD,
        },
    ]
}
