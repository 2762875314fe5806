use async_trait::async_trait;

use crate::entities::chat::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[async_trait]
pub trait AiProviderInterface {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        response_format: ResponseFormat,
    ) -> Result<String, String>;
}
