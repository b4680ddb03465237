use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pull_request::FileStatus;
use crate::diff::Hunk;

/// A file from the pull request that survived exclusion and will be reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    pub patch: String,
    pub additions: u32,
    pub deletions: u32,
    pub hunks: Vec<Hunk>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Suggestion,
    Warning,
    Critical,
}

impl Severity {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" | "error" | "high" | "blocker" => Severity::Critical,
            "warning" | "medium" | "major" => Severity::Warning,
            "info" | "note" | "low" => Severity::Info,
            _ => Severity::Suggestion,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "\u{1f6a8}",
            Severity::Warning => "\u{26a0}\u{fe0f}",
            Severity::Suggestion => "\u{1f4a1}",
            Severity::Info => "\u{2139}\u{fe0f}",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Suggestion => write!(f, "Suggestion"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Quality,
    Security,
    Performance,
    Bug,
    Style,
    Maintainability,
    Copyright,
}

impl Category {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "security" => Category::Security,
            "performance" | "perf" => Category::Performance,
            "bug" | "correctness" | "logic" => Category::Bug,
            "style" | "formatting" => Category::Style,
            "maintainability" | "readability" | "design" => Category::Maintainability,
            "copyright" | "license" | "licensing" => Category::Copyright,
            _ => Category::Quality,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Quality => "quality",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Bug => "bug",
            Category::Style => "style",
            Category::Maintainability => "maintainability",
            Category::Copyright => "copyright",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewComment {
    pub path: String,
    /// New-file line the finding refers to, if the reviewer could tell.
    pub line: Option<u32>,
    pub body: String,
    pub severity: Severity,
    pub category: Category,
    pub reviewer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewerFailure {
    pub reviewer: String,
    pub reason: String,
}

/// Outcome of running every applicable reviewer over one file.
///
/// A reviewer that fails only loses its own comments; the other reviewers'
/// findings for the file are kept.
#[derive(Debug, Clone)]
pub struct FileReview {
    pub file: ChangedFile,
    pub comments: Vec<ReviewComment>,
    pub failures: Vec<ReviewerFailure>,
}

impl FileReview {
    pub fn new(file: ChangedFile) -> Self {
        Self {
            file,
            comments: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// At least one reviewer could not produce a result for this file.
    pub fn is_unavailable(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// What a run did, for the job summary and step outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub repository: String,
    pub pull_number: u64,
    pub files_changed: usize,
    pub files_excluded: usize,
    pub files_reviewed: usize,
    pub comments_found: usize,
    pub comments_published: usize,
    pub failed_files: Vec<String>,
    pub published: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
