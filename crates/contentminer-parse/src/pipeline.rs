//! Full parse: raw text → document model + KPIs.

use contentminer_core::{Document, DocumentType, KpiSet, ParseOptions, Section};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::canonical;
use crate::kpi;
use crate::payload::ParseInput;
use crate::reflow;
use crate::sections;
use crate::sentinel::{self, SideBlock};
use crate::timestamps;

/// Parser output handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResult {
    pub sections: Document,
    pub kpis: KpiSet,
    /// Side-channel payloads removed from the narrative.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side_blocks: Vec<SideBlock>,
}

/// Turns raw analysis text into a [`ParsedResult`].
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    options: ParseOptions,
}

impl DocumentParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse text with no metadata.
    pub fn parse_text(&self, raw_text: &str) -> ParsedResult {
        self.parse(&ParseInput::from_text(raw_text))
    }

    /// Parse one input. The section path and the KPI path never affect each other.
    pub fn parse(&self, input: &ParseInput) -> ParsedResult {
        let sections = self.build_document(&input.raw_text, &input.content_gaps);
        let kpis = kpi::extract_kpis(input.metadata.as_ref(), &input.raw_text);
        let side_blocks =
            sentinel::extract_side_blocks_with(&input.raw_text, self.options.markdown_blocks);

        info!(
            "Parsed {} document: {} sections, {} side blocks",
            self.options.document_type,
            sections.len(),
            side_blocks.len()
        );

        ParsedResult {
            sections,
            kpis,
            side_blocks,
        }
    }

    /// Strip side blocks, split into sections, post-process each section.
    pub fn build_document(&self, raw_text: &str, content_gaps: &[String]) -> Document {
        let cleaned = sentinel::strip_with(raw_text, self.options.markdown_blocks);
        let raw_sections = match self.options.document_type {
            DocumentType::Generic => {
                sections::extract_sections_with(&cleaned, self.options.duplicate_ids)
            }
            DocumentType::FixedChannel => canonical::map_sections_with_gaps(&cleaned, content_gaps),
        };
        Document::new(
            raw_sections
                .into_iter()
                .map(|s| self.finish_section(s))
                .collect(),
        )
    }

    fn finish_section(&self, mut section: Section) -> Section {
        if self.options.reflow_bullets {
            section.content = reflow::reflow_lines(&section.content);
        }
        if self.options.anchor_timestamps {
            let mut anchors = Vec::new();
            section.content = section
                .content
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let (rewritten, tokens) = timestamps::anchor_line(line, i);
                    anchors.extend(tokens);
                    rewritten
                })
                .collect();
            section.anchors = anchors;
        }
        debug!(
            "Section {}: {} lines, {} anchors",
            section.id,
            section.content.len(),
            section.anchors.len()
        );
        section
    }
}

/// Parse raw text and optional metadata with the given options.
pub fn parse_document(raw_text: &str, metadata: Option<&Value>, options: &ParseOptions) -> ParsedResult {
    let input = ParseInput {
        raw_text: raw_text.to_string(),
        metadata: metadata.cloned(),
        content_gaps: Vec::new(),
    };
    DocumentParser::new(options.clone()).parse(&input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::SentinelKind;
    use contentminer_core::{DuplicateIdPolicy, MarkdownBlocks};
    use serde_json::json;

    const VIDEO_SUMMARY: &str = "---MARKDOWN START---\n## TL;DR\nA tour of the new editor at 1:05.\n\n## Key Points\nIt covers themes, plugins, keybindings.\nSee 12:30 for the demo.\n---MARKDOWN END---\n---JSON START---{\"chapters\": 3}---JSON END---";

    #[test]
    fn test_generic_pipeline_with_unwrapped_markdown() {
        let options = ParseOptions {
            markdown_blocks: MarkdownBlocks::Unwrap,
            ..ParseOptions::default()
        };
        let result = DocumentParser::new(options).parse_text(VIDEO_SUMMARY);
        let doc = &result.sections;
        assert_eq!(doc.len(), 2);

        let tldr = doc.get("tl-dr").unwrap();
        assert_eq!(tldr.content, vec!["A tour of the new editor at [⏱️ 1:05](javascript:void(0))."]);
        assert_eq!(tldr.anchors[0].total_seconds, 65);

        let points = doc.get("key-points").unwrap();
        assert_eq!(points.content[0], "• It covers themes");
        assert_eq!(points.content[2], "• keybindings");
        assert_eq!(points.anchors.len(), 1);
        assert_eq!(points.anchors[0].line, 3);
        assert_eq!(points.anchors[0].total_seconds, 750);

        assert_eq!(result.side_blocks.len(), 1);
        assert_eq!(result.side_blocks[0].kind, SentinelKind::Json);
    }

    #[test]
    fn test_unwrapped_markdown_is_narrative_only() {
        let options = ParseOptions {
            markdown_blocks: MarkdownBlocks::Unwrap,
            ..ParseOptions::default()
        };
        let result = DocumentParser::new(options)
            .parse_text("---MARKDOWN START---\n## A\nbody\n---MARKDOWN END---");
        assert_eq!(result.sections.sections()[0].content, vec!["body"]);
        assert!(result.side_blocks.is_empty());
    }

    #[test]
    fn test_default_drops_markdown_block() {
        let result = DocumentParser::default().parse_text(VIDEO_SUMMARY);
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_post_processing_can_be_disabled() {
        let options = ParseOptions {
            reflow_bullets: false,
            anchor_timestamps: false,
            ..ParseOptions::default()
        };
        let result = DocumentParser::new(options).parse_text("## Notes\nred, green, blue at 0:10.");
        let section = &result.sections.sections()[0];
        assert_eq!(section.content, vec!["red, green, blue at 0:10."]);
        assert!(section.anchors.is_empty());
    }

    #[test]
    fn test_channel_pipeline() {
        let metadata = json!({"subscriber_count": 1500000});
        let options = ParseOptions::for_type(DocumentType::FixedChannel);
        let text = "## Executive Summary\nSteady growth.\n## Action Playbook\n1. Post at 5:00 PM";
        let result = parse_document(text, Some(&metadata), &options);
        assert_eq!(result.sections.len(), 8);
        assert_eq!(result.sections.get("executive-summary").unwrap().content, vec!["Steady growth."]);
        let playbook = result.sections.get("action-playbook").unwrap();
        assert_eq!(playbook.anchors[0].raw_text, "5:00");
        assert_eq!(result.kpis.subscribers.as_deref(), Some("1.5M"));
    }

    #[test]
    fn test_channel_content_gaps_from_input() {
        let parser = DocumentParser::new(ParseOptions::for_type(DocumentType::FixedChannel));
        let input = ParseInput {
            raw_text: String::new(),
            metadata: None,
            content_gaps: vec!["Beginner guides".into()],
        };
        let result = parser.parse(&input);
        assert_eq!(result.sections.get("content-gaps").unwrap().content, vec!["1. Beginner guides"]);
    }

    #[test]
    fn test_duplicate_policy_applied() {
        let options = ParseOptions {
            duplicate_ids: DuplicateIdPolicy::Merge,
            ..ParseOptions::default()
        };
        let result = DocumentParser::new(options).parse_text("## A\none\n## A\ntwo");
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.sections.sections()[0].content, vec!["one", "two"]);
    }

    #[test]
    fn test_serialized_shape() {
        let result = DocumentParser::default().parse_text("## Intro\nhello");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sections"][0]["id"], "intro");
        assert_eq!(json["sections"][0]["sectionType"], "default");
        assert!(json["kpis"]["subscribers"].is_null());
        assert!(json.get("sideBlocks").is_none());
    }
}
