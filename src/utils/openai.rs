use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::entities::chat::ChatMessage;
use crate::interfaces::ai_provider::{AiProviderInterface, ResponseFormat};

/// OpenAI-compatible chat completion client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl AiProviderInterface for OpenAiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        response_format: ResponseFormat,
    ) -> Result<String, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "OPENAI_API_KEY not configured".to_string())?;

        let chat_request = ChatRequest {
            model: &self.model,
            messages: &messages,
            response_format: match response_format {
                ResponseFormat::JsonObject => Some(ResponseFormatRequest {
                    format_type: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .header(header::AUTHORIZATION, format!("Bearer {api_key}"))
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| format!("chat completion request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("chat completion HTTP {status}: {body}"));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("chat completion parse failed: {e}"))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "chat completion has no choices".to_string())?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
