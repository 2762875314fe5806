use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    entities::check_in::{reward_split, CheckInToken, PARTICIPANT_REWARD},
    interfaces::{
        clock::ClockInterface,
        ledger::{LedgerError, LedgerInterface},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
    },
    utils::validate_utils::deserialize_null_default,
};

pub const REWARD_TOKEN_SETTING: &str = "CS Token";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInInput {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub user_address: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub project_id: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub qr_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInReceipt {
    pub tokens_earned: u64,
    pub user_signature: String,
    pub founder_signature: String,
}

pub struct CheckInService<'a> {
    ledger: &'a (dyn LedgerInterface + Send + Sync),
    clock: &'a (dyn ClockInterface + Send + Sync),
    consumed: &'a DashMap<String, i64>,
    reward_mint: Option<&'a str>,
    ctx: &'a Ctx,
}

impl<'a> CheckInService<'a> {
    pub fn new(
        ledger: &'a (dyn LedgerInterface + Send + Sync),
        clock: &'a (dyn ClockInterface + Send + Sync),
        consumed: &'a DashMap<String, i64>,
        reward_mint: Option<&'a str>,
        ctx: &'a Ctx,
    ) -> Self {
        Self {
            ledger,
            clock,
            consumed,
            reward_mint,
            ctx,
        }
    }

    /// Issues a token for `alias` stamped with the current time.
    pub fn issue_token(&self, alias: &str) -> CheckInToken {
        CheckInToken::new(alias, self.clock.now_millis())
    }

    pub fn validate_token(&self, qr_data: &str) -> CtxResult<CheckInToken> {
        let token: CheckInToken = qr_data
            .parse()
            .map_err(|source| self.ctx.to_ctx_error(AppError::QrInvalid { source }))?;

        let now = self.clock.now_millis();
        if token.is_expired_at(now) {
            return Err(self.ctx.to_ctx_error(AppError::QrExpired));
        }
        if token.is_from_future_at(now) {
            return Err(self.ctx.to_ctx_error(AppError::QrInvalid {
                source: format!("token issued in the future at {}", token.issued_at_ms),
            }));
        }
        Ok(token)
    }

    pub async fn check_in(&self, input: &CheckInInput) -> CtxResult<CheckInReceipt> {
        let token = self.validate_token(&input.qr_data)?;

        let mint = self.reward_mint.ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::NotConfigured {
                setting: REWARD_TOKEN_SETTING.to_string(),
            })
        })?;
        let operator = self
            .ledger
            .operator_address()
            .map_err(|e| self.ctx.to_ctx_error(e.into()))?;

        let token_key = token.to_string();
        self.reserve(&token_key, token.expires_at_ms())?;

        let transfers = reward_split(&input.user_address, &operator);
        let signatures = match self.ledger.mint_rewards(mint, &transfers).await {
            Ok(signatures) => signatures,
            Err(err) => {
                self.settle_failed_issue(&token_key, &err);
                return Err(self.ctx.to_ctx_error(err.into()));
            }
        };

        let [user_signature, founder_signature] =
            <[String; 2]>::try_from(signatures).map_err(|signatures| {
                self.ctx.to_ctx_error(AppError::Ledger {
                    source: format!("expected 2 confirmations, got {}", signatures.len()),
                })
            })?;

        info!(
            req_id = %self.ctx.req_id(),
            alias = %token.alias,
            project_id = %input.project_id,
            %user_signature,
            "check-in rewarded"
        );

        Ok(CheckInReceipt {
            tokens_earned: PARTICIPANT_REWARD,
            user_signature,
            founder_signature,
        })
    }

    /// A token stays consumed unless the ledger guarantees nothing was minted.
    fn settle_failed_issue(&self, token_key: &str, err: &LedgerError) {
        if err.nothing_applied() {
            self.consumed.remove(token_key);
        } else {
            warn!(
                req_id = %self.ctx.req_id(),
                token = %token_key,
                "reward issue outcome unknown, token stays consumed: {err}"
            );
        }
    }

    fn reserve(&self, token_key: &str, expires_at_ms: i64) -> CtxResult<()> {
        let now = self.clock.now_millis();
        self.consumed.retain(|_, expires_at| *expires_at >= now);

        match self.consumed.entry(token_key.to_string()) {
            Entry::Occupied(_) => {
                warn!(req_id = %self.ctx.req_id(), token = %token_key, "check-in token replayed");
                Err(self.ctx.to_ctx_error(AppError::QrAlreadyUsed))
            }
            Entry::Vacant(slot) => {
                slot.insert(expires_at_ms);
                Ok(())
            }
        }
    }
}
