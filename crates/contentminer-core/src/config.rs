//! Parse options and their environment/file loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

pub const ENV_DOCUMENT_TYPE: &str = "CONTENTMINER_DOCUMENT_TYPE";
pub const ENV_REFLOW: &str = "CONTENTMINER_REFLOW";
pub const ENV_ANCHORS: &str = "CONTENTMINER_ANCHORS";
pub const ENV_DUPLICATE_IDS: &str = "CONTENTMINER_DUPLICATE_IDS";
pub const ENV_UNWRAP_MARKDOWN: &str = "CONTENTMINER_UNWRAP_MARKDOWN";

/// Which section extractor a document goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// Free `## ` headings (video summaries).
    #[default]
    Generic,
    /// The eight canonical channel-analysis sections.
    FixedChannel,
}

impl std::str::FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "video" => Ok(Self::Generic),
            "fixed-channel" | "channel" => Ok(Self::FixedChannel),
            other => Err(Error::Config(format!("unknown document type: {other}"))),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::FixedChannel => write!(f, "fixed-channel"),
        }
    }
}

/// What to do when two headings slug to the same section id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateIdPolicy {
    /// Suffix later ids with `-2`, `-3`, ...
    #[default]
    Disambiguate,
    /// Drop later sections whose id is already taken.
    KeepFirst,
    /// Append later content to the first section with that id.
    Merge,
}

impl std::str::FromStr for DuplicateIdPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disambiguate" => Ok(Self::Disambiguate),
            "keep-first" | "keep_first" => Ok(Self::KeepFirst),
            "merge" => Ok(Self::Merge),
            other => Err(Error::Config(format!("unknown duplicate id policy: {other}"))),
        }
    }
}

/// Handling of `---MARKDOWN START---` / `---MARKDOWN END---` blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkdownBlocks {
    /// Remove the markers and the body, like the other side blocks.
    #[default]
    Drop,
    /// Remove only the markers and keep the body as narrative text.
    Unwrap,
}

/// Options for one parse call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    #[serde(default)]
    pub document_type: DocumentType,
    /// Turn dense multi-clause sentences into bullets.
    #[serde(default = "default_true")]
    pub reflow_bullets: bool,
    /// Rewrite `m:ss` timestamps as anchor links.
    #[serde(default = "default_true")]
    pub anchor_timestamps: bool,
    #[serde(default)]
    pub duplicate_ids: DuplicateIdPolicy,
    #[serde(default)]
    pub markdown_blocks: MarkdownBlocks,
}

fn default_true() -> bool {
    true
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            document_type: DocumentType::Generic,
            reflow_bullets: true,
            anchor_timestamps: true,
            duplicate_ids: DuplicateIdPolicy::Disambiguate,
            markdown_blocks: MarkdownBlocks::Drop,
        }
    }
}

impl ParseOptions {
    /// Options for a document type with everything else defaulted.
    pub fn for_type(document_type: DocumentType) -> Self {
        Self {
            document_type,
            ..Self::default()
        }
    }

    /// Build options from `CONTENTMINER_*` environment variables over defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply any `CONTENTMINER_*` environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var(ENV_DOCUMENT_TYPE) {
            match v.parse() {
                Ok(t) => self.document_type = t,
                Err(e) => warn!("Ignoring {}: {}", ENV_DOCUMENT_TYPE, e),
            }
        }
        if let Ok(v) = std::env::var(ENV_REFLOW) {
            self.reflow_bullets = parse_flag(&v, self.reflow_bullets);
        }
        if let Ok(v) = std::env::var(ENV_ANCHORS) {
            self.anchor_timestamps = parse_flag(&v, self.anchor_timestamps);
        }
        if let Ok(v) = std::env::var(ENV_UNWRAP_MARKDOWN) {
            let unwrap = parse_flag(&v, self.markdown_blocks == MarkdownBlocks::Unwrap);
            self.markdown_blocks = if unwrap {
                MarkdownBlocks::Unwrap
            } else {
                MarkdownBlocks::Drop
            };
        }
        if let Ok(v) = std::env::var(ENV_DUPLICATE_IDS) {
            match v.parse() {
                Ok(p) => self.duplicate_ids = p,
                Err(e) => warn!("Ignoring {}: {}", ENV_DUPLICATE_IDS, e),
            }
        }
        self
    }

    /// Load options from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(options) => {
                info!("Loaded parse options from {}", path.display());
                options
            }
            Err(e) => {
                warn!("Using default parse options ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load options from a JSON file.
    pub fn try_load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn parse_flag(value: &str, current: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => true,
        "0" | "false" | "off" | "no" => false,
        other => {
            warn!("Unrecognised flag value {:?}, keeping {}", other, current);
            current
        }
    }
}
