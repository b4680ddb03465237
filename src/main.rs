use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prreviewer::action::write_job_outputs;
use prreviewer::github::{event::parse_repository, load_event_context};
use prreviewer::models::PullRequestContext;
use prreviewer::{Config, Error, GitHubClient, PipelineConfig, ReviewPipeline};

#[derive(Parser, Debug)]
#[command(name = "prreviewer")]
#[command(version = "0.1.0")]
#[command(about = "Review pull request diffs with AI and post the findings as a review")]
struct Args {
    /// Print the review instead of posting it
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Webhook payload of the triggering event
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Review this pull request number instead of the one in the event payload
    #[arg(long)]
    pr: Option<u64>,

    #[arg(long, env = "GITHUB_STEP_SUMMARY", hide = true)]
    step_summary: Option<PathBuf>,

    #[arg(long, env = "GITHUB_OUTPUT", hide = true)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("prreviewer=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration, failing before any network call
    let config = Config::from_env()?;
    tracing::info!(
        "Backend: {}, reviewers: {}",
        config.backend,
        config
            .enabled_reviewers
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Create pipeline
    let pipeline_config = PipelineConfig {
        dry_run: args.dry_run,
        ..PipelineConfig::from(&config)
    };
    let pipeline = ReviewPipeline::from_config(&config, pipeline_config)?;

    // Resolve the pull request and run the review
    let pr = resolve_pull_request(&args, &pipeline.github()).await?;
    let report = pipeline.run(&pr).await?;

    // Report to the Actions job
    write_job_outputs(&report, args.step_summary.as_deref(), args.output.as_deref());

    if !report.failed_files.is_empty() {
        tracing::warn!(
            "Review unavailable for {} file(s): {}",
            report.failed_files.len(),
            report.failed_files.join(", ")
        );
    }

    Ok(())
}

async fn resolve_pull_request(args: &Args, github: &GitHubClient) -> prreviewer::Result<PullRequestContext> {
    if let Some(number) = args.pr {
        let full_name = args
            .repository
            .as_deref()
            .ok_or_else(|| Error::Config("--pr requires --repository or GITHUB_REPOSITORY".to_string()))?;
        let (owner, repo) = parse_repository(full_name)?;
        let details = github
            .get_pull_request(&owner, &repo, number)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        return Ok(PullRequestContext {
            owner,
            repo,
            number: details.number,
            head_sha: details.head.sha,
            title: details.title,
            body: details.body,
        });
    }

    let event_path = args.event_path.as_deref().ok_or_else(|| {
        Error::Config("GITHUB_EVENT_PATH is not set; pass --event-path or --pr".to_string())
    })?;
    load_event_context(event_path, args.repository.as_deref())
}
