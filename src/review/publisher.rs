use std::sync::Arc;

use crate::diff::commentable_lines;
use crate::error::{Error, Result};
use crate::github::{GitHubClient, InlineComment, ReviewPayload};
use crate::models::{FileReview, PullRequestContext, ReviewComment};

const MAX_REASON_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub review: Option<ReviewPayload>,
    pub posted: bool,
}

impl PublishOutcome {
    pub fn inline_comments(&self) -> usize {
        self.review.as_ref().map(|r| r.comments.len()).unwrap_or(0)
    }
}

pub struct CommentPublisher {
    github: Arc<GitHubClient>,
    dry_run: bool,
}

impl CommentPublisher {
    pub fn new(github: Arc<GitHubClient>, dry_run: bool) -> Self {
        Self { github, dry_run }
    }

    pub async fn publish(
        &self,
        pr: &PullRequestContext,
        reviews: &[FileReview],
        reviewer_names: &[&str],
    ) -> Result<PublishOutcome> {
        let Some(review) = build_review(pr, reviews, reviewer_names) else {
            tracing::info!("No issues found to comment on");
            return Ok(PublishOutcome {
                review: None,
                posted: false,
            });
        };

        if self.dry_run {
            tracing::info!("Dry run: not posting review");
            println!("{}", serde_json::to_string_pretty(&review)?);
            return Ok(PublishOutcome {
                review: Some(review),
                posted: false,
            });
        }

        self.github
            .create_review(pr, &review)
            .await
            .map_err(|e| Error::Publish(e.to_string()))?;

        Ok(PublishOutcome {
            review: Some(review),
            posted: true,
        })
    }
}

/// Fold all findings into one review: one inline comment per file plus a summary body.
///
/// Returns `None` when there is nothing to say.
pub fn build_review(
    pr: &PullRequestContext,
    reviews: &[FileReview],
    reviewer_names: &[&str],
) -> Option<ReviewPayload> {
    let with_comments: Vec<&FileReview> = reviews.iter().filter(|r| !r.comments.is_empty()).collect();
    let unavailable: Vec<&FileReview> = reviews.iter().filter(|r| r.is_unavailable()).collect();

    if with_comments.is_empty() && unavailable.is_empty() {
        return None;
    }

    let mut inline = Vec::new();
    let mut unanchored = Vec::new();

    for review in &with_comments {
        let commentable = commentable_lines(&review.file.hunks);

        let anchor = review
            .comments
            .iter()
            .filter_map(|c| c.line)
            .filter(|line| commentable.contains(line))
            .min()
            .or_else(|| commentable.iter().next().copied());

        let body = format_file_comment(&review.file.path, &review.comments);
        match anchor {
            Some(line) => inline.push(InlineComment {
                path: review.file.path.clone(),
                line,
                side: "RIGHT".to_string(),
                body,
            }),
            None => unanchored.push(body),
        }
    }

    let finding_count: usize = with_comments.iter().map(|r| r.comments.len()).sum();
    let mut body = String::from("## \u{1f916} AI Code Review\n\n");
    body.push_str(&format!(
        "Reviewed {} file(s) with: {}. Found {} finding(s) in {} file(s).\n",
        reviews.len(),
        reviewer_names.join(", "),
        finding_count,
        with_comments.len()
    ));

    for text in &unanchored {
        body.push_str("\n---\n\n");
        body.push_str(text);
    }

    if !unavailable.is_empty() {
        body.push_str("\n### Review unavailable\n\n");
        for review in &unavailable {
            for failure in &review.failures {
                let reason: String = failure.reason.chars().take(MAX_REASON_CHARS).collect();
                body.push_str(&format!(
                    "- `{}` ({}): {}\n",
                    review.file.path, failure.reviewer, reason
                ));
            }
        }
    }

    Some(ReviewPayload {
        commit_id: pr.head_sha.clone(),
        body,
        event: "COMMENT".to_string(),
        comments: inline,
    })
}

fn format_file_comment(path: &str, comments: &[ReviewComment]) -> String {
    let mut sorted: Vec<&ReviewComment> = comments.iter().collect();
    sorted.sort_by(|a, b| {
        a.line
            .unwrap_or(0)
            .cmp(&b.line.unwrap_or(0))
            .then(b.severity.cmp(&a.severity))
    });

    let mut out = format!("**Review of `{}`** ({} finding(s))\n\n", path, comments.len());
    for c in sorted {
        let location = c
            .line
            .map(|l| format!("line {}", l))
            .unwrap_or_else(|| "file".to_string());
        let mut lines = c.body.lines();
        let first = lines.next().unwrap_or_default();
        out.push_str(&format!(
            "- {} **{}** \u{b7} {} \u{b7} {} ({}): {}\n",
            c.severity.emoji(),
            c.severity,
            c.category,
            location,
            c.reviewer,
            first
        ));
        for rest in lines {
            out.push_str(&format!("  {}\n", rest));
        }
    }
    out
}
