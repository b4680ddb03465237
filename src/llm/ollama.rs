use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OllamaConfig;
use crate::error::{Error, Result};
use crate::llm::parser::parse_review_response;
use crate::llm::prompts::{ReviewRequest, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;
use crate::models::ReviewComment;

pub struct OllamaProvider {
    client: Client,
    host: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: String,
    options: ChatOptions,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            // Avoid //api/chat
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn review(&self, request: &ReviewRequest) -> Result<Vec<ReviewComment>> {
        let url = format!("{}/api/chat", self.host);
        tracing::debug!(
            "Sending ~{} tokens for {} to Ollama model {}",
            request.estimate_tokens(),
            request.path,
            self.model
        );

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model: self.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system".to_string(),
                        content: SYSTEM_PROMPT.to_string(),
                    },
                    ChatMessage {
                        role: "user".to_string(),
                        content: request.to_prompt(),
                    },
                ],
                stream: false,
                format: "json".to_string(),
                options: ChatOptions { temperature: 0.2 },
            })
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Ollama request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("Ollama error ({}): {}", status, body)));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse Ollama response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::Backend(error));
        }

        let text = result.message.map(|m| m.content).unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::Backend("Empty response from Ollama".to_string()));
        }

        parse_review_response(&text, &request.path, "ai")
    }

    fn max_context_tokens(&self) -> usize {
        8_192
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
