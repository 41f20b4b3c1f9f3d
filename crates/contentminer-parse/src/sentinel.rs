//! Side-channel block removal.
//!
//! Upstream output can carry payloads wrapped in `---KIND START---` /
//! `---KIND END---` markers (markdown, JSON, social). They are not part of
//! the narrative document and are cut out before section parsing.

use std::borrow::Cow;

use contentminer_core::MarkdownBlocks;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

// Lazy bodies so two adjacent blocks of the same kind stay separate.
static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)---MARKDOWN START---(?P<markdown>.*?)---MARKDOWN END---|---JSON START---(?P<json>.*?)---JSON END---|---SOCIAL START---(?P<social>.*?)---SOCIAL END---",
    )
    .unwrap()
});
static MARKDOWN_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"---MARKDOWN (?:START|END)---").unwrap());

/// Kind of side block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelKind {
    Markdown,
    Json,
    Social,
}

/// Payload of one delimited block, markers excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideBlock {
    pub kind: SentinelKind,
    pub body: String,
}

impl SideBlock {
    /// Parse a JSON block's body. `None` for other kinds or invalid JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        if self.kind != SentinelKind::Json {
            return None;
        }
        serde_json::from_str(self.body.trim()).ok()
    }
}

/// Remove every side block (markers and body) and trim the result.
pub fn strip(text: &str) -> String {
    strip_with(text, MarkdownBlocks::Drop)
}

/// Remove side blocks, optionally keeping markdown block bodies.
///
/// Runs until nothing is left to remove, so the result is a fixed point.
pub fn strip_with(text: &str, markdown: MarkdownBlocks) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = strip_once(&current, markdown).trim().to_string();
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str, markdown: MarkdownBlocks) -> Cow<'_, str> {
    let stripped = BLOCK_RE.replace_all(text, |caps: &Captures| match caps.name("markdown") {
        Some(body) if markdown == MarkdownBlocks::Unwrap => body.as_str().to_string(),
        _ => String::new(),
    });
    if markdown == MarkdownBlocks::Unwrap && MARKDOWN_MARKER_RE.is_match(&stripped) {
        return Cow::Owned(MARKDOWN_MARKER_RE.replace_all(&stripped, "").into_owned());
    }
    stripped
}

/// Collect the payloads `strip` would discard, in source order.
pub fn extract_side_blocks(text: &str) -> Vec<SideBlock> {
    extract_side_blocks_with(text, MarkdownBlocks::Drop)
}

/// Collect the payloads `strip_with` would discard; unwrapped markdown bodies stay in the text and are skipped.
pub fn extract_side_blocks_with(text: &str, markdown: MarkdownBlocks) -> Vec<SideBlock> {
    extract_all(text)
        .into_iter()
        .filter(|b| !(markdown == MarkdownBlocks::Unwrap && b.kind == SentinelKind::Markdown))
        .collect()
}

fn extract_all(text: &str) -> Vec<SideBlock> {
    BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let (kind, body) = if let Some(m) = caps.name("markdown") {
                (SentinelKind::Markdown, m)
            } else if let Some(m) = caps.name("json") {
                (SentinelKind::Json, m)
            } else {
                (SentinelKind::Social, caps.name("social")?)
            };
            Some(SideBlock {
                kind,
                body: body.as_str().trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_all_kinds() {
        let text = "Intro\n---JSON START---{\"a\": 1}---JSON END---\nBody\n---SOCIAL START---tweet---SOCIAL END---\n---MARKDOWN START---md---MARKDOWN END---";
        assert_eq!(strip(text), "Intro\n\nBody");
    }

    #[test]
    fn test_adjacent_blocks_not_conflated() {
        let text = "---JSON START---a---JSON END---keep---JSON START---b---JSON END---";
        assert_eq!(strip(text), "keep");
    }

    #[test]
    fn test_unterminated_block_untouched() {
        let text = "before ---JSON START--- never closed";
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_unwrap_markdown_keeps_body() {
        let text = "---MARKDOWN START---\n## TL;DR\nShort.\n---MARKDOWN END---\n---JSON START---{}---JSON END---";
        assert_eq!(strip_with(text, MarkdownBlocks::Unwrap), "## TL;DR\nShort.");
    }

    #[test]
    fn test_unwrap_removes_stray_markdown_markers() {
        let text = "---MARKDOWN START---\n## Title\nline";
        assert_eq!(strip_with(text, MarkdownBlocks::Unwrap), "## Title\nline");
    }

    #[test]
    fn test_idempotent_on_nested_markers() {
        let text = "---JSON START------JSON START---x---JSON END------JSON END--- tail";
        let once = strip(text);
        assert_eq!(strip(&once), once);
        assert!(once.len() <= text.len());
    }

    #[test]
    fn test_extract_side_blocks() {
        let text = "x ---SOCIAL START--- post ---SOCIAL END--- y ---JSON START---{\"views\": 10}---JSON END---";
        let blocks = extract_side_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, SentinelKind::Social);
        assert_eq!(blocks[0].body, "post");
        assert!(blocks[0].json().is_none());
        assert_eq!(blocks[1].json().unwrap()["views"], 10);
    }

    #[test]
    fn test_unwrapped_markdown_not_reported() {
        let text = "---MARKDOWN START---\n## A\nbody\n---MARKDOWN END---\n---JSON START---{}---JSON END---";
        let dropped = extract_side_blocks_with(text, MarkdownBlocks::Drop);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].kind, SentinelKind::Markdown);

        let unwrapped = extract_side_blocks_with(text, MarkdownBlocks::Unwrap);
        assert_eq!(unwrapped.len(), 1);
        assert_eq!(unwrapped[0].kind, SentinelKind::Json);
    }

    #[test]
    fn test_invalid_json_block() {
        let blocks = extract_side_blocks("---JSON START---not json---JSON END---");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].json().is_none());
    }
}
