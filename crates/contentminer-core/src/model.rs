//! Document model shared by the parser and its consumers.
//!
//! Everything here is derived data: a parse call builds a fresh
//! [`Document`] and [`KpiSet`] from the raw text and the caller owns them.
//! Field names serialize in camelCase to match the rendering layer.

use serde::{Deserialize, Serialize};

/// Presentation tag for a section. Never affects parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    ContentStrategy,
    AudienceAnalysis,
    GrowthOpportunities,
    Insights,
    #[default]
    Default,
}

impl SectionType {
    /// Guess a type from a heading's wording.
    pub fn detect(title: &str) -> Self {
        let lower = title.to_lowercase();
        if lower.contains("content") && lower.contains("strategy") {
            Self::ContentStrategy
        } else if lower.contains("audience") || lower.contains("demographics") {
            Self::AudienceAnalysis
        } else if lower.contains("growth") || lower.contains("opportunities") {
            Self::GrowthOpportunities
        } else if lower.contains("insights") {
            Self::Insights
        } else {
            Self::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentStrategy => "content-strategy",
            Self::AudienceAnalysis => "audience-analysis",
            Self::GrowthOpportunities => "growth-opportunities",
            Self::Insights => "insights",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognised `m:ss` substring inside a section's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampToken {
    /// Matched text, e.g. `"12:04"`.
    pub raw_text: String,
    /// `minutes * 60 + seconds`.
    pub total_seconds: u32,
    /// Index of the content line holding the match.
    pub line: usize,
    /// Byte range of the match in the line before anchor rewriting.
    pub start: usize,
    pub end: usize,
}

/// One titled, addressable division of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Slug, unique within its document.
    pub id: String,
    /// Heading text as written.
    pub title: String,
    /// Body lines in source order.
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<SectionType>,
    /// Display glyph (canonical sections only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<TimestampToken>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: Vec::new(),
            section_type: None,
            icon: None,
            anchors: Vec::new(),
        }
    }

    pub fn with_type(mut self, section_type: SectionType) -> Self {
        self.section_type = Some(section_type);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_content<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Content lines joined back into body text.
    pub fn body(&self) -> String {
        self.content.join("\n")
    }

    pub fn is_tldr(&self) -> bool {
        self.title.to_lowercase().contains("tl;dr")
    }
}

/// Table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
}

/// Ordered sequence of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Find a section by id.
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.sections
            .iter()
            .map(|s| TocEntry {
                id: s.id.clone(),
                title: s.title.clone(),
            })
            .collect()
    }

    /// Split off the first TL;DR section as the hero; the rest keep their order.
    pub fn split_tldr(&self) -> (Option<&Section>, Vec<&Section>) {
        let hero_idx = self.sections.iter().position(Section::is_tldr);
        let rest = self
            .sections
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != hero_idx)
            .map(|(_, s)| s)
            .collect();
        (hero_idx.map(|i| &self.sections[i]), rest)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl From<Vec<Section>> for Document {
    fn from(sections: Vec<Section>) -> Self {
        Self::new(sections)
    }
}

/// The six recognised channel metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiKey {
    Subscribers,
    Videos,
    Views,
    AvgViews,
    Engagement,
    UploadFreq,
}

impl KpiKey {
    pub const ALL: [KpiKey; 6] = [
        KpiKey::Subscribers,
        KpiKey::Videos,
        KpiKey::Views,
        KpiKey::AvgViews,
        KpiKey::Engagement,
        KpiKey::UploadFreq,
    ];

    /// Serialized key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiKey::Subscribers => "subscribers",
            KpiKey::Videos => "videos",
            KpiKey::Views => "views",
            KpiKey::AvgViews => "avgViews",
            KpiKey::Engagement => "engagement",
            KpiKey::UploadFreq => "uploadFreq",
        }
    }
}

/// Metric name → display string, `None` when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub subscribers: Option<String>,
    pub videos: Option<String>,
    pub views: Option<String>,
    pub avg_views: Option<String>,
    pub engagement: Option<String>,
    pub upload_freq: Option<String>,
}

impl KpiSet {
    pub fn get(&self, key: KpiKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn set(&mut self, key: KpiKey, value: Option<String>) {
        *self.slot_mut(key) = value;
    }

    /// True when no metric was recovered.
    pub fn is_empty(&self) -> bool {
        KpiKey::ALL.iter().all(|k| self.slot(*k).is_none())
    }

    fn slot(&self, key: KpiKey) -> &Option<String> {
        match key {
            KpiKey::Subscribers => &self.subscribers,
            KpiKey::Videos => &self.videos,
            KpiKey::Views => &self.views,
            KpiKey::AvgViews => &self.avg_views,
            KpiKey::Engagement => &self.engagement,
            KpiKey::UploadFreq => &self.upload_freq,
        }
    }

    fn slot_mut(&mut self, key: KpiKey) -> &mut Option<String> {
        match key {
            KpiKey::Subscribers => &mut self.subscribers,
            KpiKey::Videos => &mut self.videos,
            KpiKey::Views => &mut self.views,
            KpiKey::AvgViews => &mut self.avg_views,
            KpiKey::Engagement => &mut self.engagement,
            KpiKey::UploadFreq => &mut self.upload_freq,
        }
    }
}
