//! Dense prose → bullet list reflow.
//!
//! A sentence-like run (no `.` or newline inside, ending in `.`) with at least
//! two `,`/`;` delimiters is split on those delimiters. Three or more
//! non-empty clauses become one bullet each; otherwise the run is kept.
//! Best-effort only: lists of names or numbers trigger it too.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Bullet marker placed before each clause.
pub const BULLET: &str = "• ";

static DENSE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.\n]*[,;][^.\n]*[,;][^.\n]*\.").unwrap());
static CLAUSE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;]").unwrap());

/// Split a run into its trimmed, non-empty clauses.
pub fn clauses(run: &str) -> Vec<&str> {
    CLAUSE_SPLIT_RE
        .split(run)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Rewrite dense runs in `text` as newline-separated bullets.
pub fn reflow_text(text: &str) -> String {
    DENSE_RUN_RE
        .replace_all(text, |caps: &Captures| {
            let run = &caps[0];
            let parts = clauses(run);
            if parts.len() <= 2 {
                return run.to_string();
            }
            let bullets: Vec<String> = parts
                .iter()
                .map(|c| format!("{BULLET}{}", c.strip_suffix('.').unwrap_or(c)))
                .collect();
            format!("\n{}\n", bullets.join("\n"))
        })
        .into_owned()
}

/// Reflow one content line into one or more non-blank lines.
///
/// A line that does not reflow comes back unchanged.
pub fn reflow_line(line: &str) -> Vec<String> {
    let reflowed = reflow_text(line);
    if reflowed == line {
        return vec![line.to_string()];
    }
    reflowed
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reflow every line of a section's content, keeping order.
pub fn reflow_lines(lines: &[String]) -> Vec<String> {
    lines.iter().flat_map(|l| reflow_line(l)).collect()
}
