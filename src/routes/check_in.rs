use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    middleware::{
        ctx::Ctx, error::CtxResult, mw_ctx::CtxState, utils::extractor_utils::JsonValidated,
    },
    services::check_in_service::{CheckInInput, CheckInService},
    utils::validate_utils::deserialize_null_default,
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/check-in", post(check_in))
        .route("/api/check-in/qr", post(issue_qr))
}

fn check_in_service<'a>(state: &'a CtxState, ctx: &'a Ctx) -> CheckInService<'a> {
    CheckInService::new(
        state.ledger.as_ref(),
        state.clock.as_ref(),
        &state.consumed_check_ins,
        state.cs_token_mint.as_deref(),
        ctx,
    )
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub success: bool,
    pub tokens_earned: u64,
    pub user_signature: String,
    pub founder_signature: String,
}

async fn check_in(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    JsonValidated(input): JsonValidated<CheckInInput>,
) -> CtxResult<Json<CheckInResponse>> {
    let receipt = check_in_service(&state, &ctx).check_in(&input).await?;
    Ok(Json(CheckInResponse {
        success: true,
        tokens_earned: receipt.tokens_earned,
        user_signature: receipt.user_signature,
        founder_signature: receipt.founder_signature,
    }))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct IssueQrInput {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub alias: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueQrResponse {
    pub success: bool,
    pub qr_data: String,
    pub expires_at: i64,
}

async fn issue_qr(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    JsonValidated(input): JsonValidated<IssueQrInput>,
) -> CtxResult<Json<IssueQrResponse>> {
    let token = check_in_service(&state, &ctx).issue_token(&input.alias);
    Ok(Json(IssueQrResponse {
        success: true,
        qr_data: token.to_string(),
        expires_at: token.expires_at_ms(),
    }))
}
