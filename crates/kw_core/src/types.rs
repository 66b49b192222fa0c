use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Error;

/// Keyword collections the service is allowed to read from.
///
/// Request path segments are parsed into this type before they reach a
/// storage backend, so an arbitrary string is never used as a collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordCollection {
    Primary,
    Secondary,
    #[serde(rename = "Long-Tail")]
    LongTail,
}

impl KeywordCollection {
    pub const ALL: [KeywordCollection; 3] = [Self::Primary, Self::Secondary, Self::LongTail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
            Self::LongTail => "Long-Tail",
        }
    }
}

impl fmt::Display for KeywordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeywordCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidCollection(s.to_string()))
    }
}

/// Typed projection of a stored keyword document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    #[serde(default, deserialize_with = "volume_from_number")]
    pub search_volume: i64,
    #[serde(default)]
    pub seo_difficulty: f64,
}

impl KeywordRecord {
    pub fn new(keyword: impl Into<String>, search_volume: i64, seo_difficulty: f64) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume,
            seo_difficulty,
        }
    }

    /// Decode a stored document, logging the ones that cannot be ranked.
    pub fn from_document(document: &Value) -> Option<Self> {
        match Self::deserialize(document) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping keyword document {}: {}", document, e);
                None
            }
        }
    }
}

/// Importers write search volumes as integers or floats; floats are truncated.
fn volume_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<serde_json::Number>::deserialize(deserializer)? {
        None => Ok(0),
        Some(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|v| v as i64))
            .ok_or_else(|| D::Error::custom(format!("invalid search volume {}", n))),
    }
}

/// Optional restriction applied when picking the top keywords of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordFilter {
    Any,
    /// Keyword contains the given term (case-sensitive substring).
    Containing(String),
    /// Keyword does not contain the given term.
    Excluding(String),
}

impl KeywordFilter {
    pub fn matches(&self, keyword: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Containing(term) => keyword.contains(term.as_str()),
            Self::Excluding(term) => !keyword.contains(term.as_str()),
        }
    }
}

/// One entry of the optimisation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationLog {
    pub keywords: Vec<String>,
    pub text: String,
    pub success: bool,
    pub feedback: bool,
    pub timestamp: DateTime<Utc>,
}

impl OptimizationLog {
    pub fn new(keywords: Vec<String>, text: impl Into<String>, success: bool, feedback: bool) -> Self {
        Self {
            keywords,
            text: text.into(),
            success,
            feedback,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Body returned by `POST /optimize`. Every field defaults when absent so
/// partial responses from other implementations still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizeResponse {
    pub optimized_text: String,
    pub highlighted_keywords: Vec<String>,
    pub current_seo_score: f64,
    pub target_seo_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsSubmitRequest {
    #[serde(default)]
    pub optimized_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_allow_list() {
        assert_eq!("Primary".parse::<KeywordCollection>().unwrap(), KeywordCollection::Primary);
        assert_eq!("long-tail".parse::<KeywordCollection>().unwrap(), KeywordCollection::LongTail);
        assert!("unknown_collection".parse::<KeywordCollection>().is_err());
        assert!("Primary; drop".parse::<KeywordCollection>().is_err());
    }

    #[test]
    fn test_optimize_response_defaults_missing_fields() {
        let response: OptimizeResponse =
            serde_json::from_str(r#"{"optimizedText":"hello"}"#).unwrap();
        assert_eq!(response.optimized_text, "hello");
        assert!(response.highlighted_keywords.is_empty());
        assert_eq!(response.current_seo_score, 0.0);
        assert_eq!(response.target_seo_score, 0.0);
    }

    #[test]
    fn test_keyword_record_accepts_float_volume() {
        let record = KeywordRecord::from_document(&serde_json::json!({
            "keyword": "nursing",
            "searchVolume": 1200.0,
            "seoDifficulty": 41
        }))
        .unwrap();
        assert_eq!(record, KeywordRecord::new("nursing", 1200, 41.0));

        let record =
            KeywordRecord::from_document(&serde_json::json!({"keyword": "x", "searchVolume": null}))
                .unwrap();
        assert_eq!(record.search_volume, 0);
        assert!(KeywordRecord::from_document(&serde_json::json!({"searchVolume": 5})).is_none());
    }

    #[test]
    fn test_keyword_filter() {
        assert!(KeywordFilter::Any.matches("anything"));
        assert!(KeywordFilter::Containing("apprenticeships".into()).matches("degree apprenticeships uk"));
        assert!(!KeywordFilter::Excluding("apprenticeships".into()).matches("degree apprenticeships uk"));
    }
}
