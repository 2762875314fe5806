use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    entities::chat::{ChatMessage, HistoryMessage},
    interfaces::ai_provider::{AiProviderInterface, ResponseFormat},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
    },
    utils::validate_utils::deserialize_null_default,
};

pub const ASSISTANT_INSTRUCTION: &str = "You are a helpful AI assistant for a DAO collaboration platform. Help users find projects, complete tasks, and collaborate with others.";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub conversation_history: Vec<HistoryMessage>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub user_message: String,
}

pub struct ChatService<'a> {
    ai_provider: &'a (dyn AiProviderInterface + Send + Sync),
    ctx: &'a Ctx,
}

impl<'a> ChatService<'a> {
    pub fn new(ai_provider: &'a (dyn AiProviderInterface + Send + Sync), ctx: &'a Ctx) -> Self {
        Self { ai_provider, ctx }
    }

    pub async fn reply(&self, input: ChatInput) -> CtxResult<String> {
        let turns = input.conversation_history.len();
        let messages = conversation(input);
        let response = self
            .ai_provider
            .complete(messages, ResponseFormat::Text)
            .await
            .map_err(|source| self.ctx.to_ctx_error(AppError::AiProvider { source }))?;
        info!(req_id = %self.ctx.req_id(), turns, "chat reply");
        Ok(response)
    }
}

/// System instruction, then the client's history, then the new user message.
pub fn conversation(input: ChatInput) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(input.conversation_history.len() + 2);
    messages.push(ChatMessage::system(ASSISTANT_INSTRUCTION));
    messages.extend(input.conversation_history.into_iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(input.user_message));
    messages
}
