use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::models::{ChangedFile, FileReview, PullRequestContext, ReviewerFailure};
use crate::reviewers::Reviewer;

/// Runs every enabled reviewer over every changed file.
///
/// Files are reviewed concurrently up to `concurrency_limit`. A reviewer
/// error is recorded on that file's [`FileReview`] and never stops the others.
pub struct ReviewerDispatcher {
    reviewers: Vec<Arc<dyn Reviewer>>,
    concurrency_limit: usize,
}

impl ReviewerDispatcher {
    pub fn new(reviewers: Vec<Arc<dyn Reviewer>>, concurrency_limit: usize) -> Self {
        Self {
            reviewers,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty()
    }

    pub async fn dispatch(&self, files: Vec<ChangedFile>, pr: &PullRequestContext) -> Vec<FileReview> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));

        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let review_futures = files.into_iter().map(|file| {
            let sem = semaphore.clone();
            let reviewers = &self.reviewers;
            let pb = pb.clone();

            async move {
                let _permit = sem.acquire().await.ok();
                let review = review_one(reviewers, file, pr).await;
                pb.inc(1);
                review
            }
        });

        let reviews = join_all(review_futures).await;
        pb.finish_and_clear();
        reviews
    }
}

async fn review_one(
    reviewers: &[Arc<dyn Reviewer>],
    file: ChangedFile,
    pr: &PullRequestContext,
) -> FileReview {
    let mut review = FileReview::new(file);
    tracing::info!("Processing file: {}", review.file.path);

    for reviewer in reviewers {
        if !reviewer.can_review_file(&review.file.path) {
            continue;
        }

        match reviewer.review_file(&review.file, pr).await {
            Ok(comments) => {
                if !comments.is_empty() {
                    tracing::info!(
                        "Found {} issue(s) in {} with {}",
                        comments.len(),
                        review.file.path,
                        reviewer.name()
                    );
                }
                review.comments.extend(comments);
            }
            Err(e) => {
                tracing::warn!(
                    "{} review unavailable for {}: {}",
                    reviewer.name(),
                    review.file.path,
                    e
                );
                review.failures.push(ReviewerFailure {
                    reviewer: reviewer.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    review
}
