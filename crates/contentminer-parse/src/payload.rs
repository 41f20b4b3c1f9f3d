//! Backend response shapes and their conversion into parser input.
//!
//! Video jobs return `{url, summary, metadata}`; channel jobs return
//! `{url, analysis, content_gaps, metadata}` where `analysis` may be plain
//! text or a JSON object.

use contentminer_core::{DocumentType, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text and side data handed to the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseInput {
    pub raw_text: String,
    pub metadata: Option<Value>,
    /// Channel content gaps listed outside the analysis text.
    pub content_gaps: Vec<String>,
}

impl ParseInput {
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// `analysis` field: free text or a structured object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Text(String),
    Structured(Value),
}

impl AnalysisPayload {
    /// Text form; objects become 2-space pretty JSON, `null` becomes empty.
    pub fn to_text(&self) -> String {
        match self {
            AnalysisPayload::Text(s) => s.clone(),
            AnalysisPayload::Structured(Value::Null) => String::new(),
            AnalysisPayload::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }
}

impl Default for AnalysisPayload {
    fn default() -> Self {
        AnalysisPayload::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummaryResponse {
    #[serde(default)]
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl VideoSummaryResponse {
    pub fn into_input(self) -> ParseInput {
        ParseInput {
            raw_text: self.summary,
            metadata: self.metadata,
            content_gaps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnalysisResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub analysis: AnalysisPayload,
    #[serde(default)]
    pub content_gaps: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl ChannelAnalysisResponse {
    pub fn into_input(self) -> ParseInput {
        ParseInput {
            raw_text: self.analysis.to_text(),
            metadata: self.metadata,
            content_gaps: self.content_gaps,
        }
    }
}

/// Either backend response, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Video(VideoSummaryResponse),
    Channel(ChannelAnalysisResponse),
}

impl ResultPayload {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ResultPayload::Video(_) => DocumentType::Generic,
            ResultPayload::Channel(_) => DocumentType::FixedChannel,
        }
    }

    pub fn into_input(self) -> ParseInput {
        match self {
            ResultPayload::Video(r) => r.into_input(),
            ResultPayload::Channel(r) => r.into_input(),
        }
    }
}

/// Decode a response body, telling the kinds apart by their fields.
///
/// `summary` marks a video response; `analysis` or `content_gaps` a channel one.
pub fn decode_payload(json: &str) -> Result<ResultPayload> {
    let value: Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(Error::Payload("response body is not a JSON object".into()));
    };
    if object.contains_key("summary") {
        Ok(ResultPayload::Video(serde_json::from_value(value)?))
    } else if object.contains_key("analysis") || object.contains_key("content_gaps") {
        Ok(ResultPayload::Channel(serde_json::from_value(value)?))
    } else {
        Err(Error::Payload("expected a `summary` or `analysis` field".into()))
    }
}

/// Decode a backend response body for the given document type.
pub fn decode_response(json: &str, document_type: DocumentType) -> Result<ParseInput> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(Error::Payload("response body is not a JSON object".into()));
    }
    match document_type {
        DocumentType::Generic => {
            let response: VideoSummaryResponse = serde_json::from_value(value)?;
            Ok(response.into_input())
        }
        DocumentType::FixedChannel => {
            let response: ChannelAnalysisResponse = serde_json::from_value(value)?;
            Ok(response.into_input())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_response() {
        let body = json!({
            "url": "https://youtube.com/watch?v=x",
            "summary": "## TL;DR\nShort.",
            "metadata": {"duration": "10:30", "views": "1000"}
        });
        let input = decode_response(&body.to_string(), DocumentType::Generic).unwrap();
        assert_eq!(input.raw_text, "## TL;DR\nShort.");
        assert_eq!(input.metadata.unwrap()["views"], "1000");
        assert!(input.content_gaps.is_empty());
    }

    #[test]
    fn test_channel_response_with_text_analysis() {
        let body = json!({
            "url": "https://youtube.com/@chan",
            "analysis": "## Executive Summary\nGood.",
            "content_gaps": ["Shorts"],
            "metadata": {"subscriber_count": 1200}
        });
        let input = decode_response(&body.to_string(), DocumentType::FixedChannel).unwrap();
        assert_eq!(input.raw_text, "## Executive Summary\nGood.");
        assert_eq!(input.content_gaps, vec!["Shorts"]);
    }

    #[test]
    fn test_structured_analysis_pretty_printed() {
        let payload: AnalysisPayload = serde_json::from_value(json!({"summary": "hi"})).unwrap();
        assert_eq!(payload.to_text(), "{\n  \"summary\": \"hi\"\n}");
    }

    #[test]
    fn test_null_analysis_is_empty() {
        let body = json!({"analysis": null});
        let input = decode_response(&body.to_string(), DocumentType::FixedChannel).unwrap();
        assert_eq!(input.raw_text, "");
    }

    #[test]
    fn test_video_response_requires_summary() {
        let err = decode_response(r#"{"url": "x"}"#, DocumentType::Generic).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_decode_payload_detects_kind() {
        let body = json!({"summary": "## A\nx"});
        let video = decode_payload(&body.to_string()).unwrap();
        assert_eq!(video.document_type(), DocumentType::Generic);
        assert_eq!(video.into_input().raw_text, "## A\nx");

        let channel = decode_payload(r#"{"analysis": {"k": 1}, "content_gaps": ["Shorts"]}"#).unwrap();
        assert_eq!(channel.document_type(), DocumentType::FixedChannel);
        let input = channel.into_input();
        assert!(input.raw_text.contains("\"k\": 1"));
        assert_eq!(input.content_gaps, vec!["Shorts"]);
    }

    #[test]
    fn test_decode_payload_unknown_shape() {
        let err = decode_payload(r#"{"url": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }

    #[test]
    fn test_non_object_body() {
        let err = decode_response("[1, 2]", DocumentType::Generic).unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }
}
