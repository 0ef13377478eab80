use crate::embed::ensure_dimension;
use crate::error::Result;
use crate::types::{IndexedPoint, PointPayload, ScoredPoint};
use dossier_chunker::{MetadataFilter, SourceDocument};
use uuid::Uuid;

/// Divisor floor for cosine similarity: zero-norm vectors score 0 against
/// everything instead of dividing by zero.
const NORM_EPSILON: f32 = 1e-12;

/// Brute-force in-memory backend: a full linear scan with cosine scoring
/// over every stored point. Used whenever no remote similarity service is
/// configured or reachable.
pub struct LocalIndex {
    dimension: usize,
    points: Vec<IndexedPoint>,
}

impl LocalIndex {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: Vec::new(),
        }
    }

    /// Store one point per (document, vector) pair with a fresh UUID.
    /// Content-equal duplicates are stored as distinct points.
    pub fn upsert(&mut self, docs: &[SourceDocument], vectors: &[Vec<f32>]) -> Result<usize> {
        for vector in vectors {
            ensure_dimension(vector, self.dimension)?;
        }

        for (doc, vector) in docs.iter().zip(vectors.iter()) {
            self.points.push(IndexedPoint {
                id: Uuid::new_v4().to_string(),
                vector: vector.clone(),
                payload: PointPayload::from(doc),
            });
        }

        Ok(vectors.len())
    }

    /// Linear scan. The metadata filter excludes points before ranking, so
    /// `top_k` is always filled from the eligible set.
    pub fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        ensure_dimension(query_vector, self.dimension)?;

        let mut hits: Vec<ScoredPoint> = self
            .points
            .iter()
            .filter(|point| filter.map_or(true, |f| f.matches(&point.payload.metadata)))
            .map(|point| ScoredPoint {
                score: cosine_similarity(query_vector, &point.vector),
                payload: point.payload.clone(),
            })
            .collect();

        // Stable sort keeps insertion order for tied scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Cosine similarity with an epsilon-floored divisor. Degenerate zero-norm
/// vectors deterministically score 0 rather than panicking or yielding NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / (norm_a.max(NORM_EPSILON) * norm_b.max(NORM_EPSILON))
}
