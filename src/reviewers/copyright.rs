use std::sync::Arc;

use async_trait::async_trait;

use crate::diff::{commentable_lines, detect_language};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{Category, ChangedFile, PullRequestContext, ReviewComment, Severity};
use crate::reviewers::Reviewer;

const HEADER_SCAN_LINES: usize = 10;
const MIN_SNIPPET_CHARS: usize = 40;
const MAX_SNIPPET_CHARS: usize = 120;
const MAX_SEARCHES_PER_FILE: usize = 5;

const MISSING_HEADER_MESSAGE: &str =
    "Missing copyright header. Please add a copyright notice at the top of the file.";

/// Checks for a copyright notice and for added code that already exists elsewhere on GitHub.
pub struct CopyrightReviewer {
    github: Arc<GitHubClient>,
    max_searches_per_file: usize,
}

impl CopyrightReviewer {
    pub fn new(github: Arc<GitHubClient>) -> Self {
        Self {
            github,
            max_searches_per_file: MAX_SEARCHES_PER_FILE,
        }
    }

    pub fn with_max_searches(mut self, max: usize) -> Self {
        self.max_searches_per_file = max;
        self
    }

    pub fn has_copyright_header(content: &str) -> bool {
        content
            .lines()
            .take(HEADER_SCAN_LINES)
            .any(|l| l.to_lowercase().contains("copyright"))
    }

    /// Added lines long and distinctive enough to be worth a code search.
    fn search_candidates<'a>(file: &'a ChangedFile) -> impl Iterator<Item = (u32, &'a str)> + 'a {
        file.hunks
            .iter()
            .flat_map(|h| h.added_lines())
            .filter_map(|l| l.new_line.map(|n| (n, l.content.trim())))
            .filter(|(_, text)| text.chars().count() >= MIN_SNIPPET_CHARS)
            .filter(|(_, text)| {
                let lower = text.to_lowercase();
                !(lower.starts_with("import ")
                    || lower.starts_with("from ")
                    || lower.starts_with("use ")
                    || lower.starts_with("#include")
                    || lower.starts_with("//")
                    || lower.starts_with('#')
                    || lower.contains("copyright"))
            })
    }

    async fn check_header(
        &self,
        file: &ChangedFile,
        pr: &PullRequestContext,
    ) -> Result<Option<ReviewComment>> {
        let Some(content) = self
            .github
            .get_file_content(&pr.owner, &pr.repo, &file.path, &pr.head_sha)
            .await?
        else {
            return Ok(None);
        };

        if Self::has_copyright_header(&content) {
            return Ok(None);
        }

        let line = commentable_lines(&file.hunks)
            .into_iter()
            .next()
            .filter(|first| *first <= HEADER_SCAN_LINES as u32);

        Ok(Some(ReviewComment {
            path: file.path.clone(),
            line,
            body: MISSING_HEADER_MESSAGE.to_string(),
            severity: Severity::Info,
            category: Category::Copyright,
            reviewer: self.name().to_string(),
        }))
    }

    async fn check_uniqueness(&self, file: &ChangedFile, pr: &PullRequestContext) -> Vec<ReviewComment> {
        let mut comments = Vec::new();

        for (line, text) in Self::search_candidates(file).take(self.max_searches_per_file) {
            let snippet: String = text.chars().take(MAX_SNIPPET_CHARS).collect();
            let query = format!(
                "\"{}\" in:file -repo:{}",
                snippet.replace('"', " "),
                pr.full_name()
            );

            match self.github.search_code(&query).await {
                Ok(0) => {}
                Ok(hits) => comments.push(ReviewComment {
                    path: file.path.clone(),
                    line: Some(line),
                    body: format!(
                        "This line also appears in {} other file(s) on GitHub. Please make sure it is not copied from a source with an incompatible license: `{}`",
                        hits, snippet
                    ),
                    severity: Severity::Info,
                    category: Category::Copyright,
                    reviewer: self.name().to_string(),
                }),
                Err(e) => {
                    tracing::warn!("Code search failed for {}:{}: {}", file.path, line, e);
                }
            }
        }

        comments
    }
}

#[async_trait]
impl Reviewer for CopyrightReviewer {
    fn name(&self) -> &str {
        "copyright"
    }

    fn can_review_file(&self, path: &str) -> bool {
        !matches!(
            detect_language(path),
            None | Some("YAML" | "TOML" | "XML" | "HTML" | "CSS" | "GraphQL")
        )
    }

    async fn review_file(
        &self,
        file: &ChangedFile,
        pr: &PullRequestContext,
    ) -> Result<Vec<ReviewComment>> {
        let mut comments = Vec::new();

        if let Some(comment) = self.check_header(file, pr).await? {
            comments.push(comment);
        }

        comments.extend(self.check_uniqueness(file, pr).await);

        Ok(comments)
    }
}
