pub mod ai;
pub mod copyright;
pub mod security;

pub use ai::AiReviewer;
pub use copyright::CopyrightReviewer;
pub use security::SecurityReviewer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::llm::provider_from_config;
use crate::models::{ChangedFile, PullRequestContext, ReviewComment};

/// A named check run over every changed file it applies to.
#[async_trait]
pub trait Reviewer: Send + Sync {
    fn name(&self) -> &str;

    fn can_review_file(&self, _path: &str) -> bool {
        true
    }

    async fn review_file(
        &self,
        file: &ChangedFile,
        pr: &PullRequestContext,
    ) -> Result<Vec<ReviewComment>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewerKind {
    Ai,
    Security,
    Copyright,
}

impl ReviewerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewerKind::Ai => "ai",
            ReviewerKind::Security => "security",
            ReviewerKind::Copyright => "copyright",
        }
    }
}

impl std::str::FromStr for ReviewerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Ok(ReviewerKind::Ai),
            "security" => Ok(ReviewerKind::Security),
            "copyright" => Ok(ReviewerKind::Copyright),
            other => Err(Error::Config(format!("unknown reviewer '{}'", other))),
        }
    }
}

impl std::fmt::Display for ReviewerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instantiate the enabled reviewers in configuration order.
pub fn build_reviewers(config: &Config, github: Arc<GitHubClient>) -> Result<Vec<Arc<dyn Reviewer>>> {
    let mut reviewers: Vec<Arc<dyn Reviewer>> = Vec::new();

    for kind in &config.enabled_reviewers {
        let reviewer: Arc<dyn Reviewer> = match kind {
            ReviewerKind::Ai => {
                let provider = provider_from_config(config)?;
                Arc::new(AiReviewer::new(provider, config.max_diff_tokens))
            }
            ReviewerKind::Security => Arc::new(SecurityReviewer::new()),
            ReviewerKind::Copyright => Arc::new(CopyrightReviewer::new(github.clone())),
        };
        tracing::info!("Initialized {} reviewer", kind);
        reviewers.push(reviewer);
    }

    Ok(reviewers)
}
