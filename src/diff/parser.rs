use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    pub content: String,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
    pub header: String,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn added_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Added)
    }
}

fn hunk_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$")
            .expect("hunk header regex is valid")
    })
}

/// Parse the `patch` field GitHub returns for a pull request file.
///
/// The patch has no `diff --git` preamble; it starts directly at the first
/// hunk header. Line numbers are tracked on both sides so comments can be
/// anchored on new-file lines.
pub fn parse_patch(patch: &str) -> Result<Vec<Hunk>> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;

    for raw in patch.lines() {
        if raw.starts_with("@@") {
            let caps = hunk_header()
                .captures(raw)
                .ok_or_else(|| Error::ParseError(format!("malformed hunk header: {}", raw)))?;

            let num = |i: usize, default: u32| -> Result<u32> {
                match caps.get(i) {
                    Some(m) => m
                        .as_str()
                        .parse()
                        .map_err(|_| Error::ParseError(format!("bad hunk range in: {}", raw))),
                    None => Ok(default),
                }
            };

            let hunk = Hunk {
                old_start: num(1, 0)?,
                old_len: num(2, 1)?,
                new_start: num(3, 0)?,
                new_len: num(4, 1)?,
                header: caps.get(5).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                lines: Vec::new(),
            };
            old_line = hunk.old_start;
            new_line = hunk.new_start;
            hunks.push(hunk);
            continue;
        }

        let Some(hunk) = hunks.last_mut() else {
            // Anything before the first header (should not happen for GitHub patches)
            continue;
        };

        if raw.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        let (kind, content) = match raw.chars().next() {
            Some('+') => (LineKind::Added, &raw[1..]),
            Some('-') => (LineKind::Removed, &raw[1..]),
            Some(' ') => (LineKind::Context, &raw[1..]),
            _ => (LineKind::Context, raw),
        };

        let line = match kind {
            LineKind::Added => {
                let line = DiffLine {
                    kind,
                    content: content.to_string(),
                    old_line: None,
                    new_line: Some(new_line),
                };
                new_line += 1;
                line
            }
            LineKind::Removed => {
                let line = DiffLine {
                    kind,
                    content: content.to_string(),
                    old_line: Some(old_line),
                    new_line: None,
                };
                old_line += 1;
                line
            }
            LineKind::Context => {
                let line = DiffLine {
                    kind,
                    content: content.to_string(),
                    old_line: Some(old_line),
                    new_line: Some(new_line),
                };
                old_line += 1;
                new_line += 1;
                line
            }
        };
        hunk.lines.push(line);
    }

    Ok(hunks)
}

/// New-file line numbers that GitHub accepts inline comments on.
pub fn commentable_lines(hunks: &[Hunk]) -> BTreeSet<u32> {
    hunks
        .iter()
        .flat_map(|h| h.lines.iter())
        .filter_map(|l| l.new_line)
        .collect()
}
