pub mod provider;
pub mod azure;
pub mod ollama;
pub mod prompts;
pub mod parser;
pub mod budget;

pub use provider::LLMProvider;
pub use azure::AzureOpenAIProvider;
pub use ollama::OllamaProvider;
pub use prompts::ReviewRequest;
pub use budget::DiffBudget;

use std::sync::Arc;

use crate::config::{AiBackend, Config};
use crate::error::{Error, Result};

/// Build the provider selected by `AI_BACKEND`.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    match config.backend {
        AiBackend::Azure => {
            let azure = config.azure.as_ref().ok_or_else(|| {
                Error::Config("Azure OpenAI settings are required for the azure backend".to_string())
            })?;
            Ok(Arc::new(AzureOpenAIProvider::new(azure, config.request_timeout_secs)?))
        }
        AiBackend::Ollama => Ok(Arc::new(OllamaProvider::new(
            &config.ollama,
            config.request_timeout_secs,
        )?)),
    }
}
