//! ContentMiner Core — document model, parse options, error type.

pub mod config;
pub mod error;
pub mod model;

pub use config::{DocumentType, DuplicateIdPolicy, MarkdownBlocks, ParseOptions};
pub use error::{Error, Result};
pub use model::{Document, KpiKey, KpiSet, Section, SectionType, TimestampToken, TocEntry};
