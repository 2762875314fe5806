use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    entities::{ai_match::TaskVerification, chat::ChatMessage},
    interfaces::ai_provider::{AiProviderInterface, ResponseFormat},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
    },
    utils::validate_utils::deserialize_null_default,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyInput {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub task_description: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub proof_text: String,
    pub proof_image_url: Option<String>,
}

pub struct VerificationService<'a> {
    ai_provider: &'a (dyn AiProviderInterface + Send + Sync),
    ctx: &'a Ctx,
}

impl<'a> VerificationService<'a> {
    pub fn new(ai_provider: &'a (dyn AiProviderInterface + Send + Sync), ctx: &'a Ctx) -> Self {
        Self { ai_provider, ctx }
    }

    pub async fn verify(&self, input: &VerifyInput) -> CtxResult<TaskVerification> {
        let content = self
            .ai_provider
            .complete(
                vec![ChatMessage::user(verification_prompt(input))],
                ResponseFormat::JsonObject,
            )
            .await
            .map_err(|source| self.ctx.to_ctx_error(AppError::AiProvider { source }))?;

        let verification = TaskVerification::decode(&content)
            .map_err(|source| self.ctx.to_ctx_error(AppError::SchemaViolation { source }))?;
        info!(req_id = %self.ctx.req_id(), verified = verification.verified, "proof reviewed");
        Ok(verification)
    }
}

pub fn verification_prompt(input: &VerifyInput) -> String {
    let image_line = input
        .proof_image_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(|url| format!("Image URL: {url}"))
        .unwrap_or_default();

    format!(
        r#"You are an AI verifier for a DAO platform.

Task: {task}
Proof submitted: {proof}
{image_line}

Determine if the proof demonstrates task completion. Be reasonable but ensure quality.

Respond in JSON format:
{{
  "verified": true/false,
  "feedback": "explanation of your decision"
}}"#,
        task = input.task_description,
        proof = input.proof_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_image_only_when_given() {
        let mut input = VerifyInput {
            task_description: "Design a logo".to_string(),
            proof_text: "Uploaded to figma".to_string(),
            proof_image_url: None,
        };
        assert!(!verification_prompt(&input).contains("Image URL"));
        input.proof_image_url = Some("https://img/logo.png".to_string());
        assert!(verification_prompt(&input).contains("Image URL: https://img/logo.png"));
    }
}
