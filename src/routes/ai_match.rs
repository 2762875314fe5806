use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    entities::ai_match::{AiMatch, TaskVerification},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::CtxState,
        utils::extractor_utils::{from_value_validated, JsonValidated},
    },
    services::{
        chat_service::{ChatInput, ChatService},
        match_service::{MatchInput, MatchService},
        verification_service::{VerificationService, VerifyInput},
    },
    utils::validate_utils::deserialize_null_default,
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/ai-match", post(ai_action))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AiActionRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub action: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiActionResponse {
    Match {
        success: bool,
        #[serde(rename = "match")]
        ai_match: AiMatch,
    },
    Chat {
        success: bool,
        response: String,
    },
    Verify {
        success: bool,
        verification: TaskVerification,
    },
}

async fn ai_action(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    JsonValidated(request): JsonValidated<AiActionRequest>,
) -> CtxResult<Json<AiActionResponse>> {
    let ai_provider = state.ai_provider.as_ref();
    let data = Value::Object(request.data);

    let response = match request.action.as_str() {
        "match" => {
            let input: MatchInput =
                from_value_validated(data).map_err(|e| ctx.to_ctx_error(e))?;
            let ai_match = MatchService::new(ai_provider, &ctx)
                .find_match(&input)
                .await?;
            AiActionResponse::Match {
                success: true,
                ai_match,
            }
        }
        "chat" => {
            let input: ChatInput = from_value_validated(data).map_err(|e| ctx.to_ctx_error(e))?;
            let response = ChatService::new(ai_provider, &ctx).reply(input).await?;
            AiActionResponse::Chat {
                success: true,
                response,
            }
        }
        "verify" => {
            let input: VerifyInput =
                from_value_validated(data).map_err(|e| ctx.to_ctx_error(e))?;
            let verification = VerificationService::new(ai_provider, &ctx)
                .verify(&input)
                .await?;
            AiActionResponse::Verify {
                success: true,
                verification,
            }
        }
        other => {
            return Err(ctx.to_ctx_error(AppError::InvalidAction {
                action: other.to_string(),
            }))
        }
    };
    Ok(Json(response))
}
