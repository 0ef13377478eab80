use dossier_chunker::{Metadata, SourceDocument};
use serde::{Deserialize, Serialize};

/// The payload stored alongside each vector: everything fusion needs to
/// re-identify a chunk without access to backend-internal ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointPayload {
    pub source: String,
    pub doc_type: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl From<&SourceDocument> for PointPayload {
    fn from(doc: &SourceDocument) -> Self {
        Self {
            source: doc.source.clone(),
            doc_type: doc.doc_type.clone(),
            content: doc.content.clone(),
            metadata: doc.metadata.clone(),
        }
    }
}

/// A stored (vector, payload) pair. Identity is assigned at insertion and
/// never reused; duplicate payloads are legal across repeated ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// One search hit: cosine similarity in [-1, 1] plus the stored payload.
/// Score semantics are identical across backends so fusion never needs to
/// know which backend answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: PointPayload,
}
