use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{PullRequestContext, PullRequestEvent};

/// Split `owner/repo` as found in `GITHUB_REPOSITORY`.
pub fn parse_repository(full_name: &str) -> Result<(String, String)> {
    match full_name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Config(format!(
            "invalid repository '{}', expected owner/repo",
            full_name
        ))),
    }
}

/// Build the pull request context from the webhook payload GitHub writes to
/// `GITHUB_EVENT_PATH`.
///
/// `repository` (normally `GITHUB_REPOSITORY`) wins over the payload's own
/// repository field when both are present.
pub fn load_event_context(event_path: &Path, repository: Option<&str>) -> Result<PullRequestContext> {
    let raw = std::fs::read_to_string(event_path).map_err(|e| {
        Error::Config(format!(
            "cannot read event payload {}: {}",
            event_path.display(),
            e
        ))
    })?;

    let event: PullRequestEvent = serde_json::from_str(&raw).map_err(|e| {
        Error::Config(format!(
            "event payload is not a pull_request event ({}); run on pull_request or pull_request_target",
            e
        ))
    })?;

    let full_name = repository
        .map(str::to_string)
        .or_else(|| event.repository.as_ref().map(|r| r.full_name.clone()))
        .ok_or_else(|| Error::Config("GITHUB_REPOSITORY is not set".to_string()))?;
    let (owner, repo) = parse_repository(&full_name)?;

    Ok(PullRequestContext {
        owner,
        repo,
        number: event.pull_request.number,
        head_sha: event.pull_request.head.sha,
        title: event.pull_request.title,
        body: event.pull_request.body,
    })
}
