use serde::{Deserialize, Serialize};

use crate::error::{PageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationType {
    #[default]
    Content,
    Continue,
    Summarize,
    Improve,
    Title,
    Template,
}

impl GenerationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::Content => "content",
            GenerationType::Continue => "continue",
            GenerationType::Summarize => "summarize",
            GenerationType::Improve => "improve",
            GenerationType::Title => "title",
            GenerationType::Template => "template",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: GenerationType,
}

impl GenerateRequest {
    pub fn new(kind: GenerationType, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
            kind,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(PageError::InvalidRequest("Prompt is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

// Chat-completions wire format.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_type_defaults_to_content() {
        let req: GenerateRequest = serde_json::from_value(json!({"prompt": "hi"})).unwrap();
        assert_eq!(req.kind, GenerationType::Content);
        assert!(req.context.is_none());
    }

    #[test]
    fn request_serializes_kind_as_type() {
        let req = GenerateRequest::new(GenerationType::Title, "text").with_context("ctx");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"prompt": "text", "context": "ctx", "type": "title"}));
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let err = GenerateRequest::new(GenerationType::Content, "  ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidRequest(_)));
    }

    #[test]
    fn chat_response_tolerates_missing_fields() {
        let resp: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.choices.is_empty());
        assert!(resp.usage.is_none());
    }
}
