//! GitHub Actions job integration: step summary and step outputs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::ReviewReport;

pub fn render_step_summary(report: &ReviewReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "## AI review of {}#{}\n\n",
        report.repository, report.pull_number
    ));
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    out.push_str(&format!("| Files changed | {} |\n", report.files_changed));
    out.push_str(&format!("| Files excluded | {} |\n", report.files_excluded));
    out.push_str(&format!("| Files reviewed | {} |\n", report.files_reviewed));
    out.push_str(&format!("| Findings | {} |\n", report.comments_found));
    out.push_str(&format!(
        "| Inline comments | {} |\n",
        report.comments_published
    ));
    out.push_str(&format!(
        "| Review posted | {} |\n",
        if report.published { "yes" } else { "no" }
    ));

    if !report.failed_files.is_empty() {
        out.push_str("\n### Review unavailable\n\n");
        for path in &report.failed_files {
            out.push_str(&format!("- `{}`\n", path));
        }
    }

    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!(
        "\n---\n*Finished {} in {:.1}s*\n",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        elapsed.num_milliseconds() as f64 / 1000.0
    ));

    out
}

pub fn render_outputs(report: &ReviewReport) -> String {
    format!(
        "comments={}\nfailed-files={}\n",
        report.comments_published,
        report.failed_files.len()
    )
}

fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// Append the summary and outputs to the files the runner hands us.
///
/// Either path may be absent outside of Actions. Write errors are logged only.
pub fn write_job_outputs(report: &ReviewReport, summary_path: Option<&Path>, output_path: Option<&Path>) {
    if let Some(path) = summary_path {
        if let Err(e) = append(path, &render_step_summary(report)) {
            tracing::warn!("Could not write step summary to {}: {}", path.display(), e);
        }
    }

    if let Some(path) = output_path {
        if let Err(e) = append(path, &render_outputs(report)) {
            tracing::warn!("Could not write step outputs to {}: {}", path.display(), e);
        }
    }
}
