//! `m:ss` timestamp recognition and anchor rewriting.
//!
//! Any one- or two-digit group, a colon, and two digits counts; ranges are
//! not validated. Matches are rewritten as links to a no-op target so the
//! rendering layer can intercept them and seek.

use contentminer_core::TimestampToken;
use once_cell::sync::Lazy;
use regex::Regex;

/// Link target the rendering layer intercepts.
pub const ANCHOR_TARGET: &str = "javascript:void(0)";
/// Prefix on the anchor label.
pub const ANCHOR_GLYPH: &str = "⏱️";

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

/// Find every timestamp in `line`, left to right.
pub fn tokenize(line: &str, line_index: usize) -> Vec<TimestampToken> {
    TIMESTAMP_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let minutes: u32 = caps[1].parse().ok()?;
            let seconds: u32 = caps[2].parse().ok()?;
            Some(TimestampToken {
                raw_text: whole.as_str().to_string(),
                total_seconds: minutes * 60 + seconds,
                line: line_index,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Render the anchor markup for one timestamp.
pub fn anchor(raw: &str) -> String {
    format!("[{ANCHOR_GLYPH} {raw}]({ANCHOR_TARGET})")
}

/// Rewrite each timestamp in `line` as an anchor; tokens keep offsets into the input line.
pub fn anchor_line(line: &str, line_index: usize) -> (String, Vec<TimestampToken>) {
    let tokens = tokenize(line, line_index);
    if tokens.is_empty() {
        return (line.to_string(), tokens);
    }
    let mut out = String::with_capacity(line.len() + tokens.len() * 24);
    let mut last = 0;
    for token in &tokens {
        out.push_str(&line[last..token.start]);
        out.push_str(&anchor(&token.raw_text));
        last = token.end;
    }
    out.push_str(&line[last..]);
    (out, tokens)
}

/// Recover the timestamp from a rendered anchor label (`"⏱️ 1:23"` → `"1:23"`).
pub fn parse_anchor_label(label: &str) -> Option<&str> {
    let raw = label.trim().strip_prefix(ANCHOR_GLYPH)?.trim();
    TIMESTAMP_RE
        .find(raw)
        .filter(|m| m.start() == 0 && m.end() == raw.len())
        .map(|m| m.as_str())
}
