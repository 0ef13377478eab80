use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form document metadata: string keys mapped to arbitrary scalar
/// values. Key order is irrelevant.
pub type Metadata = serde_json::Map<String, Value>;

/// A uniform unit of scraped text produced by ingestion collaborators
/// (web scraper, news feed, PDF parser) and consumed by the chunker.
///
/// Immutable once ingested. The chunker derives child documents from it;
/// everything downstream operates on those chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// Origin identifier (URL or origin tag)
    pub source: String,

    /// Origin category tag (e.g. "website_title", "news_article")
    pub doc_type: String,

    /// Extracted text
    pub content: String,

    /// Arbitrary scalar metadata attached by the ingester
    #[serde(default)]
    pub metadata: Metadata,
}

impl SourceDocument {
    #[must_use]
    pub const fn new(
        source: String,
        doc_type: String,
        content: String,
        metadata: Metadata,
    ) -> Self {
        Self {
            source,
            doc_type,
            content,
            metadata,
        }
    }
}

/// Exact-match conjunction over metadata key/value pairs.
///
/// A document passes only if every filter entry is present in its metadata
/// with an equal value. The predicate is storage-agnostic: the local vector
/// backend and the fusion stage both evaluate it directly, while the remote
/// backend translates it into a server-side payload filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataFilter {
    conditions: Metadata,
}

impl MetadataFilter {
    #[must_use]
    pub const fn new(conditions: Metadata) -> Self {
        Self { conditions }
    }

    /// Builder: add one key/value condition.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// True when every condition matches exactly. An empty filter matches
    /// everything.
    #[must_use]
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The raw key/value conditions, for backends that push filtering
    /// server-side.
    #[must_use]
    pub const fn conditions(&self) -> &Metadata {
        &self.conditions
    }
}
