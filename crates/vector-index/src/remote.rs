use std::collections::HashMap;
use std::time::Duration;

use qdrant_client::qdrant::{
    value::Kind, Condition, CreateCollectionBuilder, Distance, Filter, ListValue, PointStruct,
    SearchPointsBuilder, Struct, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::embed::ensure_dimension;
use crate::error::{Result, VectorIndexError};
use crate::types::{PointPayload, ScoredPoint};
use dossier_chunker::{Metadata, MetadataFilter, SourceDocument};

/// Qdrant-backed index. The collection is created on first connect if it
/// does not exist, configured for cosine distance at the agreed
/// dimensionality.
pub struct RemoteIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

fn backend(err: impl std::fmt::Display) -> VectorIndexError {
    VectorIndexError::Backend(err.to_string())
}

impl RemoteIndex {
    pub async fn connect(
        url: &str,
        api_key: Option<&str>,
        timeout: Duration,
        collection: &str,
        dimension: usize,
    ) -> Result<Self> {
        let mut builder = Qdrant::from_url(url).timeout(timeout);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(backend)?;

        if !client.collection_exists(collection).await.map_err(backend)? {
            client
                .create_collection(
                    CreateCollectionBuilder::new(collection).vectors_config(
                        VectorParamsBuilder::new(dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(backend)?;
            log::info!("Created collection '{collection}' ({dimension}d, cosine)");
        }

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    /// One point per (document, vector) pair, fresh UUID each. `wait(true)`
    /// so a subsequent search sees the points.
    pub async fn upsert(&self, docs: &[SourceDocument], vectors: &[Vec<f32>]) -> Result<usize> {
        for vector in vectors {
            ensure_dimension(vector, self.dimension)?;
        }

        let points: Vec<PointStruct> = docs
            .iter()
            .zip(vectors.iter())
            .map(|(doc, vector)| {
                PointStruct::new(
                    Uuid::new_v4().to_string(),
                    vector.clone(),
                    payload_for(doc),
                )
            })
            .collect();
        let count = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(backend)?;

        Ok(count)
    }

    pub async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        ensure_dimension(query_vector, self.dimension)?;

        let mut request =
            SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), top_k as u64)
                .with_payload(true);
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            request = request.filter(Filter::must(filter_conditions(filter)));
        }

        let response = self.client.search_points(request).await.map_err(backend)?;
        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                score: point.score,
                payload: parse_payload(&point.payload),
            })
            .collect())
    }
}

/// Flat payload fields plus the ingester metadata nested under "metadata",
/// so server-side filters address it as `metadata.<key>`.
fn payload_for(doc: &SourceDocument) -> Payload {
    let mut payload = Payload::new();
    payload.insert("source", doc.source.clone());
    payload.insert("doc_type", doc.doc_type.clone());
    payload.insert("content", doc.content.clone());
    payload.insert(
        "metadata",
        json_to_qdrant(&JsonValue::Object(doc.metadata.clone())),
    );
    payload
}

fn parse_payload(fields: &HashMap<String, QdrantValue>) -> PointPayload {
    PointPayload {
        source: string_field(fields, "source"),
        doc_type: string_field(fields, "doc_type"),
        content: string_field(fields, "content"),
        metadata: metadata_field(fields),
    }
}

fn string_field(fields: &HashMap<String, QdrantValue>, key: &str) -> String {
    match fields.get(key).and_then(|value| value.kind.as_ref()) {
        Some(Kind::StringValue(s)) => s.clone(),
        _ => String::new(),
    }
}

fn metadata_field(fields: &HashMap<String, QdrantValue>) -> Metadata {
    match fields.get("metadata").map(qdrant_to_json) {
        Some(JsonValue::Object(map)) => map,
        _ => Metadata::new(),
    }
}

/// Server-side equivalents of the exact-match conditions. Value types the
/// wire filter cannot express are skipped here; the fusion stage re-applies
/// the full predicate locally, so skipping only widens the candidate pool.
fn filter_conditions(filter: &MetadataFilter) -> Vec<Condition> {
    filter
        .conditions()
        .iter()
        .filter_map(|(key, value)| {
            let field = format!("metadata.{key}");
            match value {
                JsonValue::String(s) => Some(Condition::matches(field, s.clone())),
                JsonValue::Bool(b) => Some(Condition::matches(field, *b)),
                JsonValue::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Some(Condition::matches(field, i))
                    } else {
                        log::debug!("Skipping non-integer numeric filter on '{key}'");
                        None
                    }
                }
                _ => {
                    log::debug!("Skipping server-side filter on '{key}': unsupported value type");
                    None
                }
            }
        })
        .collect()
}

fn json_to_qdrant(value: &JsonValue) -> QdrantValue {
    let kind = match value {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(*b),
        JsonValue::Number(n) => n.as_i64().map_or_else(
            || Kind::DoubleValue(n.as_f64().unwrap_or(0.0)),
            Kind::IntegerValue,
        ),
        JsonValue::String(s) => Kind::StringValue(s.clone()),
        JsonValue::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(json_to_qdrant).collect(),
        }),
        JsonValue::Object(map) => Kind::StructValue(Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_qdrant(v)))
                .collect(),
        }),
    };
    QdrantValue { kind: Some(kind) }
}

fn qdrant_to_json(value: &QdrantValue) -> JsonValue {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::IntegerValue(i)) => JsonValue::from(*i),
        Some(Kind::DoubleValue(d)) => {
            serde_json::Number::from_f64(*d).map_or(JsonValue::Null, JsonValue::Number)
        }
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(qdrant_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => JsonValue::Object(
            fields
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_to_json(v)))
                .collect(),
        ),
    }
}
