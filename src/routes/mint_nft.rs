use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    entities::milestone::MilestoneMetadata,
    middleware::{
        ctx::Ctx, error::CtxResult, mw_ctx::CtxState, utils::extractor_utils::JsonValidated,
    },
    services::milestone_service::{MilestoneService, MintInput},
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/mint-nft", post(mint_nft))
        .route("/api/milestones/metadata/:key", get(get_metadata))
}

fn milestone_service<'a>(state: &'a CtxState, ctx: &'a Ctx) -> MilestoneService<'a> {
    MilestoneService::new(
        state.ledger.as_ref(),
        &state.milestone_metadata,
        state.solana_network,
        &state.app_url,
        ctx,
    )
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    pub success: bool,
    pub nft_address: String,
    pub explorer_url: String,
    pub metadata_uri: String,
}

async fn mint_nft(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    JsonValidated(input): JsonValidated<MintInput>,
) -> CtxResult<Json<MintResponse>> {
    let minted = milestone_service(&state, &ctx).mint(&input).await?;
    Ok(Json(MintResponse {
        success: true,
        nft_address: minted.nft_address,
        explorer_url: minted.explorer_url,
        metadata_uri: minted.metadata_uri,
    }))
}

async fn get_metadata(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    Path(key): Path<String>,
) -> CtxResult<Json<MilestoneMetadata>> {
    let metadata = milestone_service(&state, &ctx).get_metadata(&key)?;
    Ok(Json(metadata))
}
