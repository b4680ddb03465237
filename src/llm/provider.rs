use async_trait::async_trait;
use crate::error::Result;
use crate::llm::prompts::ReviewRequest;
use crate::models::ReviewComment;

/// A model backend that turns one file's diff into review comments.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn review(&self, request: &ReviewRequest) -> Result<Vec<ReviewComment>>;
    fn max_context_tokens(&self) -> usize;
    fn name(&self) -> &str;
}
