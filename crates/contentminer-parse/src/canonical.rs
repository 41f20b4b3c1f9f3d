//! Fixed eight-section layout for channel analyses.
//!
//! Every canonical section is a record in [`CANONICAL_SECTIONS`]. For each
//! record the [`MatchStrategy`] list is tried in order and the first non-empty
//! body wins; when none match, the record's fallback text is used. The result
//! always has all eight sections in table order.

use contentminer_core::{Section, SectionType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// One canonical section of a channel analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSection {
    pub id: &'static str,
    pub title: &'static str,
    pub section_type: SectionType,
    pub icon: &'static str,
    /// Phrases that locate the section without a heading.
    pub keywords: &'static [&'static str],
    pub fallback: &'static str,
}

pub const CONTENT_GAPS_ID: &str = "content-gaps";

pub const CANONICAL_SECTIONS: [CanonicalSection; 8] = [
    CanonicalSection {
        id: "executive-summary",
        title: "Executive Summary",
        section_type: SectionType::Insights,
        icon: "📋",
        keywords: &["executive summary", "overview"],
        fallback: "No executive summary was provided for this channel.",
    },
    CanonicalSection {
        id: "topic-frequency",
        title: "Topic Frequency",
        section_type: SectionType::ContentStrategy,
        icon: "📊",
        keywords: &["topic frequency", "most common topics", "recurring topics", "themes"],
        fallback: "Topic frequency could not be determined from this analysis.",
    },
    CanonicalSection {
        id: "typical-video-profile",
        title: "Typical Video Profile",
        section_type: SectionType::ContentStrategy,
        icon: "🎬",
        keywords: &["typical video", "video profile", "average video"],
        fallback: "No typical video profile was identified.",
    },
    CanonicalSection {
        id: "sponsor-tool-timeline",
        title: "Sponsor / Tool Timeline",
        section_type: SectionType::Default,
        icon: "🤝",
        keywords: &["sponsor", "sponsors", "sponsorships", "tools mentioned"],
        fallback: "No sponsors or tools were mentioned.",
    },
    CanonicalSection {
        id: CONTENT_GAPS_ID,
        title: "Content Gaps",
        section_type: SectionType::GrowthOpportunities,
        icon: "🔍",
        keywords: &["content gaps", "content gap", "gaps"],
        fallback: "No content gaps were identified.",
    },
    CanonicalSection {
        id: "format-style-observations",
        title: "Format & Style Observations",
        section_type: SectionType::ContentStrategy,
        icon: "🎨",
        keywords: &["format and style", "style observations", "formatting"],
        fallback: "No format or style observations were recorded.",
    },
    CanonicalSection {
        id: "title-pattern-insights",
        title: "Title Pattern Insights",
        section_type: SectionType::Insights,
        icon: "✍️",
        keywords: &["title patterns", "title pattern", "video titles"],
        fallback: "No title patterns were detected.",
    },
    CanonicalSection {
        id: "action-playbook",
        title: "Action Playbook",
        section_type: SectionType::GrowthOpportunities,
        icon: "🚀",
        keywords: &["action playbook", "playbook", "next steps", "action items", "recommendations"],
        fallback: "No action items were suggested.",
    },
];

// A markdown heading line: one to six `#` then whitespace.
static HEADING_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]").unwrap());

/// Ways of locating a canonical section's body, loosest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Heading whose text is the full title.
    ExactHeading,
    /// Heading containing the title's words in order, punctuation ignored.
    LooseHeading,
    /// One of the keywords anywhere, no heading required.
    Keyword,
}

impl MatchStrategy {
    pub const ORDER: [MatchStrategy; 3] = [
        MatchStrategy::ExactHeading,
        MatchStrategy::LooseHeading,
        MatchStrategy::Keyword,
    ];

    /// Body text for `entry`, or `None` when this strategy finds nothing usable.
    pub fn locate(&self, entry: &CanonicalSection, text: &str) -> Option<String> {
        let re = self.compile(entry)?;
        self.locate_with(&re, text)
    }

    /// Compiled pattern for `entry`; `None` when the entry gives this strategy nothing to match.
    pub fn compile(&self, entry: &CanonicalSection) -> Option<Regex> {
        Regex::new(&self.pattern(entry)?).ok()
    }

    fn locate_with(&self, re: &Regex, text: &str) -> Option<String> {
        let m = re.find(text)?;
        match self {
            MatchStrategy::Keyword => {
                // A keyword inside a heading names the section; its body starts on the next line.
                let start = if on_heading_line(text, m.start()) {
                    text[m.end()..].find('\n').map_or(text.len(), |i| m.end() + i)
                } else {
                    m.end()
                };
                let body = body_from(text, start)?;
                let trimmed = body.trim_start_matches(|c: char| {
                    c == ':' || c == '-' || c == '–' || c == '—' || c.is_whitespace()
                });
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => body_from(text, m.end()),
        }
    }

    fn pattern(&self, entry: &CanonicalSection) -> Option<String> {
        match self {
            MatchStrategy::ExactHeading => Some(format!(
                r"(?im)^[ \t]*#{{1,6}}[ \t]*(?:\d+[.)][ \t]*)?(?:\*\*)?{}(?:\*\*)?[ \t]*:?[ \t]*\r?$",
                regex::escape(entry.title)
            )),
            MatchStrategy::LooseHeading => {
                let words = title_words(entry.title);
                if words.is_empty() {
                    return None;
                }
                let joined = words
                    .iter()
                    .map(|w| regex::escape(w))
                    .collect::<Vec<_>>()
                    .join(r"[^a-z0-9\n]+");
                Some(format!(r"(?im)^[ \t]*#{{1,6}}[^\n]*?\b{joined}\b[^\n]*$"))
            }
            MatchStrategy::Keyword => {
                if entry.keywords.is_empty() {
                    return None;
                }
                let alternation = entry
                    .keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                Some(format!(r"(?i)\b(?:{alternation})\b"))
            }
        }
    }
}

/// Title reduced to its alphanumeric words.
pub fn title_words(title: &str) -> Vec<&str> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn on_heading_line(text: &str, pos: usize) -> bool {
    let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    HEADING_LINE_RE
        .find_at(text, line_start)
        .is_some_and(|h| h.start() == line_start && h.end() <= pos)
}

/// Text from `start` up to the next heading line (or the end), trimmed.
fn body_from(text: &str, start: usize) -> Option<String> {
    let end = HEADING_LINE_RE
        .find_at(text, start)
        .map(|m| m.start())
        .unwrap_or(text.len());
    let body = text.get(start..end)?.trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Outcome of resolving one canonical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Strategy that produced the body; `None` means fallback.
    pub strategy: Option<MatchStrategy>,
    pub body: String,
}

type CompiledStrategies = Vec<(MatchStrategy, Regex)>;

// Strategy patterns for every built-in record, in table order.
static COMPILED_SECTIONS: Lazy<Vec<CompiledStrategies>> =
    Lazy::new(|| CANONICAL_SECTIONS.iter().map(compile_strategies).collect());

fn compile_strategies(entry: &CanonicalSection) -> CompiledStrategies {
    MatchStrategy::ORDER
        .iter()
        .filter_map(|strategy| Some((*strategy, strategy.compile(entry)?)))
        .collect()
}

/// Try each strategy in order; fall back to the static text.
pub fn resolve(entry: &CanonicalSection, text: &str) -> Resolution {
    let owned;
    let strategies: &[(MatchStrategy, Regex)] =
        match CANONICAL_SECTIONS.iter().position(|c| c == entry) {
            Some(i) => &COMPILED_SECTIONS[i],
            None => {
                owned = compile_strategies(entry);
                &owned
            }
        };
    for (strategy, re) in strategies {
        let strategy = *strategy;
        if let Some(body) = strategy.locate_with(re, text) {
            debug!("Section {} matched by {:?}", entry.id, strategy);
            return Resolution {
                strategy: Some(strategy),
                body,
            };
        }
    }
    debug!("Section {} using fallback", entry.id);
    Resolution {
        strategy: None,
        body: entry.fallback.to_string(),
    }
}

/// Map channel-analysis text onto the eight canonical sections.
pub fn map_sections(text: &str) -> Vec<Section> {
    map_sections_with_gaps(text, &[])
}

/// As [`map_sections`], using `content_gaps` when the gaps section falls back.
pub fn map_sections_with_gaps(text: &str, content_gaps: &[String]) -> Vec<Section> {
    CANONICAL_SECTIONS
        .iter()
        .map(|entry| {
            let resolution = resolve(entry, text);
            let content: Vec<String> = match resolution.strategy {
                None if entry.id == CONTENT_GAPS_ID && has_gaps(content_gaps) => content_gaps
                    .iter()
                    .map(|g| g.trim())
                    .filter(|g| !g.is_empty())
                    .enumerate()
                    .map(|(i, g)| format!("{}. {}", i + 1, g))
                    .collect(),
                _ => resolution
                    .body
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
            };
            Section::new(entry.id, entry.title)
                .with_type(entry.section_type)
                .with_icon(entry.icon)
                .with_content(content)
        })
        .collect()
}

fn has_gaps(content_gaps: &[String]) -> bool {
    content_gaps.iter().any(|g| !g.trim().is_empty())
}
