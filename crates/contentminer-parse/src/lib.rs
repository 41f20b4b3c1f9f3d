//! ContentMiner Parse — sentinel stripping, section extraction, channel layout, timestamps, bullet reflow, KPIs.

pub mod canonical;
pub mod kpi;
pub mod payload;
pub mod pipeline;
pub mod reflow;
pub mod sections;
pub mod sentinel;
pub mod timestamps;

pub use canonical::{map_sections, map_sections_with_gaps, CanonicalSection, MatchStrategy, CANONICAL_SECTIONS};
pub use kpi::{extract_kpis, format_count, format_metric};
pub use payload::{
    decode_payload, decode_response, AnalysisPayload, ChannelAnalysisResponse, ParseInput, ResultPayload,
    VideoSummaryResponse,
};
pub use pipeline::{parse_document, DocumentParser, ParsedResult};
pub use reflow::{reflow_line, reflow_lines, reflow_text};
pub use sections::{extract_sections, extract_sections_with, slugify};
pub use sentinel::{extract_side_blocks, extract_side_blocks_with, strip, strip_with, SentinelKind, SideBlock};
pub use timestamps::{anchor_line, tokenize};
