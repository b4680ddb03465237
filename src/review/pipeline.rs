use std::sync::Arc;

use chrono::Utc;

use crate::config::{Config, PipelineConfig};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{PullRequestContext, ReviewReport};
use crate::review::collector::DiffCollector;
use crate::review::dispatcher::ReviewerDispatcher;
use crate::review::publisher::CommentPublisher;
use crate::reviewers::build_reviewers;

/// Collect, review and publish for a single pull request event.
pub struct ReviewPipeline {
    github: Arc<GitHubClient>,
    collector: DiffCollector,
    dispatcher: ReviewerDispatcher,
    publisher: CommentPublisher,
    reviewer_names: Vec<String>,
}

impl ReviewPipeline {
    pub fn from_config(config: &Config, pipeline: PipelineConfig) -> Result<Self> {
        let github = Arc::new(GitHubClient::new(&config.github_token, &config.github_api_url)?);
        let reviewers = build_reviewers(config, github.clone())?;
        let reviewer_names = reviewers.iter().map(|r| r.name().to_string()).collect();

        Ok(Self {
            collector: DiffCollector::new(github.clone(), config.exclude.clone()),
            dispatcher: ReviewerDispatcher::new(reviewers, pipeline.concurrency_limit),
            publisher: CommentPublisher::new(github.clone(), pipeline.dry_run),
            github,
            reviewer_names,
        })
    }

    pub fn github(&self) -> Arc<GitHubClient> {
        self.github.clone()
    }

    pub async fn run(&self, pr: &PullRequestContext) -> Result<ReviewReport> {
        let started_at = Utc::now();
        let mut report = ReviewReport {
            repository: pr.full_name(),
            pull_number: pr.number,
            files_changed: 0,
            files_excluded: 0,
            files_reviewed: 0,
            comments_found: 0,
            comments_published: 0,
            failed_files: Vec::new(),
            published: false,
            started_at,
            finished_at: started_at,
        };

        if self.dispatcher.is_empty() {
            tracing::warn!("No reviewers enabled, nothing to do");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        // Step 1: Fetch and filter the diff
        tracing::info!("Reviewing {}#{}: {}", report.repository, pr.number, pr.title);
        let collected = self.collector.collect(pr).await?;
        report.files_changed = collected.total();
        report.files_excluded = collected.excluded.len();

        if collected.files.is_empty() {
            tracing::info!("No files to review after exclusions");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        // Step 2: Run reviewers over every file
        tracing::info!(
            "Reviewing {} file(s) with {}",
            collected.files.len(),
            self.reviewer_names.join(", ")
        );
        let reviews = self.dispatcher.dispatch(collected.files, pr).await;

        report.files_reviewed = reviews.len();
        report.comments_found = reviews.iter().map(|r| r.comments.len()).sum();
        report.failed_files = reviews
            .iter()
            .filter(|r| r.is_unavailable())
            .map(|r| r.file.path.clone())
            .collect();

        // Step 3: Publish one review
        let names: Vec<&str> = self.reviewer_names.iter().map(String::as_str).collect();
        let outcome = self.publisher.publish(pr, &reviews, &names).await?;
        report.comments_published = outcome.inline_comments();
        report.published = outcome.posted;
        report.finished_at = Utc::now();

        tracing::info!(
            "Review complete: {} finding(s) in {} file(s), {} unavailable",
            report.comments_found,
            report.files_reviewed,
            report.failed_files.len()
        );

        Ok(report)
    }
}
