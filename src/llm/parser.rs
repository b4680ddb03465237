use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Category, ReviewComment, Severity};

#[derive(Deserialize)]
struct RawReview {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Deserialize)]
struct RawComment {
    #[serde(default)]
    line: Option<RawLine>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "comment", alias = "message")]
    body: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLine {
    Number(i64),
    Text(String),
}

impl RawLine {
    fn as_line(&self) -> Option<u32> {
        let line = match self {
            RawLine::Number(n) => u32::try_from(*n).ok(),
            RawLine::Text(s) => s.trim().parse().ok(),
        };
        line.filter(|n| *n > 0)
    }
}

/// Turn a model's answer into review comments for `path`.
pub fn parse_review_response(response: &str, path: &str, reviewer: &str) -> Result<Vec<ReviewComment>> {
    let trimmed = response.trim();

    let raw_comments: Vec<RawComment> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| Error::ParseError(format!("Failed to parse review comments: {}", e)))?
    } else {
        let json_str = extract_json(trimmed)?;
        let review: RawReview = serde_json::from_str(&json_str)
            .map_err(|e| Error::ParseError(format!("Failed to parse review comments: {}", e)))?;
        review.comments
    };

    Ok(raw_comments
        .into_iter()
        .filter(|c| !c.body.trim().is_empty())
        .map(|c| ReviewComment {
            path: path.to_string(),
            line: c.line.as_ref().and_then(RawLine::as_line),
            body: c.body.trim().to_string(),
            severity: c
                .severity
                .as_deref()
                .map(Severity::parse_lenient)
                .unwrap_or(Severity::Suggestion),
            category: c
                .category
                .as_deref()
                .map(Category::parse_lenient)
                .unwrap_or(Category::Quality),
            reviewer: reviewer.to_string(),
        })
        .collect())
}

fn extract_json(text: &str) -> Result<String> {
    // Try to find JSON block in markdown code blocks
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Ok(text[start..start + end].trim().to_string());
        }
    }

    // Try plain code block
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip any language identifier on the same line
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            let content = text[start..start + end].trim();
            if content.starts_with('{') {
                return Ok(content.to_string());
            }
        }
    }

    // Try to find raw JSON object
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Ok(text[start..end].to_string());
        }
    }

    Err(Error::ParseError("No valid JSON found in response".to_string()))
}
