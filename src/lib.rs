pub mod action;
pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod reviewers;
pub mod review;

pub use config::{AiBackend, Config, PipelineConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use llm::{AzureOpenAIProvider, LLMProvider, OllamaProvider};
pub use review::ReviewPipeline;
pub use reviewers::{Reviewer, ReviewerKind};
