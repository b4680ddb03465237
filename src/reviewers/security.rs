use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::models::{Category, ChangedFile, PullRequestContext, ReviewComment, Severity};
use crate::reviewers::Reviewer;

const DYNAMIC_EXEC_MESSAGE: &str =
    "Potential security issue: avoid `eval` or `exec`, they can execute arbitrary code.";
const HARDCODED_SECRET_MESSAGE: &str =
    "Potential hardcoded secret: load credentials from the environment or a secret store instead of committing them.";

struct Rule {
    pattern: Regex,
    message: &'static str,
    severity: Severity,
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule {
                pattern: Regex::new(r"\b(?:eval|exec)\s*\(").expect("eval rule is valid"),
                message: DYNAMIC_EXEC_MESSAGE,
                severity: Severity::Warning,
            },
            Rule {
                pattern: Regex::new(
                    r#"(?i)\b[\w.-]*(?:api[_-]?key|secret|passw(?:or)?d|token|access[_-]?key|private[_-]?key)[\w-]*["']?\s*[:=]\s*["'][^"'\s]{3,}["']"#,
                )
                .expect("secret rule is valid"),
                message: HARDCODED_SECRET_MESSAGE,
                severity: Severity::Critical,
            },
        ]
    })
}

/// Pattern checks over added lines. No network access.
#[derive(Default)]
pub struct SecurityReviewer;

impl SecurityReviewer {
    pub fn new() -> Self {
        Self
    }

    /// Messages and severities of every rule `line` trips.
    pub fn scan_line(line: &str) -> Vec<(&'static str, Severity)> {
        rules()
            .iter()
            .filter(|r| r.pattern.is_match(line))
            .map(|r| (r.message, r.severity))
            .collect()
    }
}

#[async_trait]
impl Reviewer for SecurityReviewer {
    fn name(&self) -> &str {
        "security"
    }

    async fn review_file(
        &self,
        file: &ChangedFile,
        _pr: &PullRequestContext,
    ) -> Result<Vec<ReviewComment>> {
        let mut comments = Vec::new();

        for line in file.hunks.iter().flat_map(|h| h.added_lines()) {
            for (message, severity) in Self::scan_line(&line.content) {
                comments.push(ReviewComment {
                    path: file.path.clone(),
                    line: line.new_line,
                    body: message.to_string(),
                    severity,
                    category: Category::Security,
                    reviewer: self.name().to_string(),
                });
            }
        }

        Ok(comments)
    }
}
