use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::{DiffBudget, LLMProvider, ReviewRequest};
use crate::models::{ChangedFile, PullRequestContext, ReviewComment};
use crate::reviewers::Reviewer;

/// Room left in the context window for the system prompt, PR context and answer.
const RESERVED_TOKENS: usize = 3_000;

pub struct AiReviewer {
    provider: Arc<dyn LLMProvider>,
    budget: DiffBudget,
}

impl AiReviewer {
    pub fn new(provider: Arc<dyn LLMProvider>, max_diff_tokens: usize) -> Self {
        let window = provider.max_context_tokens().saturating_sub(RESERVED_TOKENS);
        let budget = DiffBudget::new(max_diff_tokens.min(window).max(1));
        Self { provider, budget }
    }
}

#[async_trait]
impl Reviewer for AiReviewer {
    fn name(&self) -> &str {
        "ai"
    }

    async fn review_file(
        &self,
        file: &ChangedFile,
        pr: &PullRequestContext,
    ) -> Result<Vec<ReviewComment>> {
        let request = ReviewRequest::new(file, pr, &self.budget);
        if request.truncated {
            tracing::info!("Diff for {} truncated to fit the {} context", file.path, self.provider.name());
        }
        self.provider.review(&request).await
    }
}
