use crate::diff::{Hunk, LineKind};

pub const TRUNCATION_MARKER: &str = "... [diff truncated]";

/// Renders a file's hunks with new-file line numbers, cut to fit a token budget.
pub struct DiffBudget {
    max_tokens: usize,
}

impl DiffBudget {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    pub fn max_chars(&self) -> usize {
        // ~4 characters per token
        self.max_tokens * 4
    }

    /// Returns the rendered diff and whether anything was dropped.
    pub fn render(&self, hunks: &[Hunk]) -> (String, bool) {
        let max_chars = self.max_chars();
        let mut out = String::new();

        for hunk in hunks {
            let header = format!(
                "@@ -{},{} +{},{} @@ {}\n",
                hunk.old_start, hunk.old_len, hunk.new_start, hunk.new_len, hunk.header
            );
            if out.len() + header.len() > max_chars {
                out.push_str(TRUNCATION_MARKER);
                return (out, true);
            }
            out.push_str(&header);

            for line in &hunk.lines {
                let rendered = match (line.kind, line.new_line) {
                    (LineKind::Added, Some(n)) => format!("{:>5} + {}\n", n, line.content),
                    (LineKind::Context, Some(n)) => format!("{:>5}   {}\n", n, line.content),
                    _ => format!("{:>5} - {}\n", "", line.content),
                };
                if out.len() + rendered.len() > max_chars {
                    out.push_str(TRUNCATION_MARKER);
                    return (out, true);
                }
                out.push_str(&rendered);
            }
        }

        (out, false)
    }
}

impl Default for DiffBudget {
    fn default() -> Self {
        Self::new(6_000)
    }
}

pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}
