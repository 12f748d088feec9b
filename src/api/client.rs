use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use crate::api::prompts;
use crate::api::types::{ChatMessage, ChatRequest, ChatResponse, GenerateRequest, GenerateResponse};
use crate::api::Collaborator;
use crate::error::{PageError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://oi-server.onrender.com/chat/completions";
pub const DEFAULT_MODEL: &str = "openrouter/anthropic/claude-sonnet-4";

/// Chat-completions client backing the writing assistant.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl AiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(base_url: &str, api_key: &str) -> Self {
        Self::new(
            &format!("{}/chat/completions", base_url),
            DEFAULT_MODEL,
            api_key,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        req.validate()?;

        let limits = prompts::limits(req.kind);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::system_prompt(req.kind, req.context.as_deref())),
                ChatMessage::user(req.prompt.clone()),
            ],
            max_tokens: limits.max_tokens,
            temperature: limits.temperature,
        };

        debug!(kind = req.kind.as_str(), model = %self.model, "sending generation request");
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(PageError::Api { status, message });
        }

        let body = resp.json::<ChatResponse>().await?;
        let Some(choice) = body.choices.into_iter().next() else {
            return Err(PageError::Api {
                status: 500,
                message: "No content generated".into(),
            });
        };

        Ok(GenerateResponse {
            content: choice.message.content.trim().to_string(),
            usage: body.usage,
        })
    }
}

impl Collaborator for AiClient {
    fn generate(&self, req: GenerateRequest) -> BoxFuture<'_, Result<GenerateResponse>> {
        Box::pin(async move { AiClient::generate(self, &req).await })
    }
}
