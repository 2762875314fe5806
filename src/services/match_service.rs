use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    entities::{
        ai_match::AiMatch, chat::ChatMessage, participant::ParticipantProfile, project::Project,
    },
    interfaces::ai_provider::{AiProviderInterface, ResponseFormat},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
    },
    utils::validate_utils::deserialize_null_default,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ParticipantProfile,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1), nested)]
    pub available_projects: Vec<Project>,
}

pub struct MatchService<'a> {
    ai_provider: &'a (dyn AiProviderInterface + Send + Sync),
    ctx: &'a Ctx,
}

impl<'a> MatchService<'a> {
    pub fn new(ai_provider: &'a (dyn AiProviderInterface + Send + Sync), ctx: &'a Ctx) -> Self {
        Self { ai_provider, ctx }
    }

    pub async fn find_match(&self, input: &MatchInput) -> CtxResult<AiMatch> {
        let prompt = match_prompt(&input.profile, &input.available_projects);
        let content = self
            .ai_provider
            .complete(vec![ChatMessage::user(prompt)], ResponseFormat::JsonObject)
            .await
            .map_err(|source| self.ctx.to_ctx_error(AppError::AiProvider { source }))?;

        let ai_match = AiMatch::decode(&content, &input.available_projects)
            .map_err(|source| self.ctx.to_ctx_error(AppError::SchemaViolation { source }))?;

        info!(
            req_id = %self.ctx.req_id(),
            alias = %input.profile.user_alias,
            project_id = %ai_match.project_id,
            "match found"
        );
        Ok(ai_match)
    }
}

pub fn match_prompt(profile: &ParticipantProfile, projects: &[Project]) -> String {
    let project_lines = projects
        .iter()
        .map(|p| {
            format!(
                "- [id: {}] {}: {} (Needs: {})",
                p.id, p.name, p.description, p.skills_needed
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI matchmaker for a DAO collaboration platform.

User Profile:
- Alias: {alias}
- Interests: {interests}
- Skills: {skills}

Available Projects:
{project_lines}

Task: Match this user with the BEST project based on their interests and skills. Suggest a specific first task they can complete.

Respond in JSON format, using the id of the chosen project exactly as listed:
{{
  "projectId": "project_id",
  "projectName": "project_name",
  "reasoning": "why this is a good match",
  "suggestedTask": "specific task description",
  "estimatedReward": 100
}}"#,
        alias = profile.user_alias,
        interests = profile.interests,
        skills = profile.skills,
    )
}
