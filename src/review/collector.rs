use std::sync::Arc;

use crate::diff::{parse_patch, ExcludeFilter};
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::models::{ChangedFile, FileStatus, PullRequestContext, PullRequestFile};

/// Changed files split by what the run will do with them.
#[derive(Debug, Default)]
pub struct CollectedFiles {
    pub files: Vec<ChangedFile>,
    pub excluded: Vec<String>,
    /// Removed files and files GitHub sent without a patch (binary or too large).
    pub skipped: Vec<String>,
}

impl CollectedFiles {
    pub fn total(&self) -> usize {
        self.files.len() + self.excluded.len() + self.skipped.len()
    }
}

pub struct DiffCollector {
    github: Arc<GitHubClient>,
    exclude: ExcludeFilter,
}

impl DiffCollector {
    pub fn new(github: Arc<GitHubClient>, exclude: ExcludeFilter) -> Self {
        Self { github, exclude }
    }

    pub async fn collect(&self, pr: &PullRequestContext) -> Result<CollectedFiles> {
        let files = self
            .github
            .list_pull_request_files(pr)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        tracing::info!("Pull request changes {} file(s)", files.len());
        Ok(select_files(files, &self.exclude))
    }
}

/// Apply the exclude list and turn API entries into reviewable files.
pub fn select_files(files: Vec<PullRequestFile>, exclude: &ExcludeFilter) -> CollectedFiles {
    let mut collected = CollectedFiles::default();

    for file in files {
        if exclude.is_excluded(&file.filename) {
            tracing::debug!("Excluding {}", file.filename);
            collected.excluded.push(file.filename);
            continue;
        }

        let status = FileStatus::from(file.status.as_str());
        if status == FileStatus::Removed {
            tracing::debug!("Skipping removed file {}", file.filename);
            collected.skipped.push(file.filename);
            continue;
        }

        let Some(patch) = file.patch.filter(|p| !p.trim().is_empty()) else {
            tracing::debug!("Skipping {} (no patch)", file.filename);
            collected.skipped.push(file.filename);
            continue;
        };

        let hunks = match parse_patch(&patch) {
            Ok(hunks) => hunks,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.filename, e);
                collected.skipped.push(file.filename);
                continue;
            }
        };

        collected.files.push(ChangedFile {
            path: file.filename,
            status,
            patch,
            additions: file.additions,
            deletions: file.deletions,
            hunks,
        });
    }

    collected
}
