use crate::diff::detect_language;
use crate::llm::budget::{estimate_tokens, DiffBudget};
use crate::models::{ChangedFile, PullRequestContext};

pub const SYSTEM_PROMPT: &str = r#"You are a senior software engineer reviewing a pull request.
You receive the diff of ONE file. Each line of the diff is prefixed with its line number in the new
version of the file, followed by `+` (added), `-` (removed, no new line number) or a space (context).

Review only the changed lines. Look for:
- bugs and logic errors
- security problems (injection, unsafe deserialization, secrets, missing validation)
- performance problems
- maintainability and readability issues worth raising in review

You must respond with valid JSON matching this exact schema:
{
    "comments": [
        {
            "line": integer (new-file line number the comment refers to),
            "severity": "critical|warning|suggestion|info",
            "category": "bug|security|performance|quality|maintainability|style",
            "body": "string, concise and actionable, markdown allowed"
        }
    ]
}

Guidelines:
- Return {"comments": []} when the change looks good. Do not praise the code.
- Never invent line numbers: use a number shown in the diff.
- One comment per distinct problem. No duplicates.
- Do not comment on formatting a linter would catch."#;

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub path: String,
    pub language: Option<String>,
    pub pr_title: String,
    pub pr_description: Option<String>,
    pub diff: String,
    pub truncated: bool,
}

impl ReviewRequest {
    pub fn new(file: &ChangedFile, pr: &PullRequestContext, budget: &DiffBudget) -> Self {
        let (diff, truncated) = budget.render(&file.hunks);
        Self {
            path: file.path.clone(),
            language: detect_language(&file.path).map(str::to_string),
            pr_title: pr.title.clone(),
            pr_description: pr.body.clone(),
            diff,
            truncated,
        }
    }

    pub fn to_prompt(&self) -> String {
        let mut prompt = format!("Pull request: {}\n", self.pr_title);

        if let Some(desc) = &self.pr_description {
            let desc = desc.trim();
            if !desc.is_empty() {
                // Long descriptions crowd out the diff
                let desc: String = desc.chars().take(1_000).collect();
                prompt.push_str(&format!("Description:\n{}\n", desc));
            }
        }

        prompt.push_str(&format!("\n## File: {}", self.path));
        if let Some(lang) = &self.language {
            prompt.push_str(&format!(" ({})", lang));
        }
        prompt.push_str("\n```diff\n");
        prompt.push_str(&self.diff);
        if !self.diff.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str("```\n");

        if self.truncated {
            prompt.push_str("\nThe diff was truncated; review only what is shown.\n");
        }

        prompt.push_str("\nProvide your review as JSON:\n");
        prompt
    }

    pub fn estimate_tokens(&self) -> usize {
        estimate_tokens(SYSTEM_PROMPT) + estimate_tokens(&self.to_prompt())
    }
}
