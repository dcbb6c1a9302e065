use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::prompt::recipe_prompt;
use crate::config::GenerationConfig;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation is not configured")]
    NotConfigured,

    #[error("model api returned status {status}")]
    Status { status: u16 },

    #[error("model returned no content")]
    NoContent,

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Produces raw recipe text for a set of ingredients and restrictions.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(
        &self,
        ingredients: &str,
        restrictions: Option<&str>,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
    }
}

/// Chat-completion client for OpenAI-compatible APIs.
#[derive(Clone)]
pub struct OpenAiGenerator {
    http: Client,
    config: GenerationConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GenerationConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RecipeGenerator for OpenAiGenerator {
    #[instrument(skip_all)]
    async fn generate(
        &self,
        ingredients: &str,
        restrictions: Option<&str>,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::NotConfigured)?;

        let prompt = recipe_prompt(ingredients, restrictions);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let res = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "model api rejected request");
            return Err(GenerationError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse = res.json().await?;
        let content = parsed.first_content().ok_or(GenerationError::NoContent)?;
        debug!(model = %self.config.model, chars = content.len(), "recipe text generated");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_content_is_used() {
        let res: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Soup\nIngredients:\n- water"}},{"message":{"content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(res.first_content().as_deref(), Some("Soup\nIngredients:\n- water"));
    }

    #[test]
    fn missing_or_blank_content_is_none() {
        let empty: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.first_content().is_none());
        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert!(blank.first_content().is_none());
        let null_msg: ChatResponse = serde_json::from_str(r#"{"choices":[{"message":null}]}"#).unwrap();
        assert!(null_msg.first_content().is_none());
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 500,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn endpoint_joins_base_url() {
        let generator = OpenAiGenerator::new(GenerationConfig {
            base_url: "http://localhost:9999/v1/".into(),
            ..GenerationConfig::default()
        })
        .unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let generator = OpenAiGenerator::new(GenerationConfig::default()).unwrap();
        let err = generator.generate("eggs", None).await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
    }
}
