use std::collections::HashMap;

use serde::Serialize;

use dossier_chunker::{Metadata, MetadataFilter, SourceDocument};
use dossier_vector_index::ScoredPoint;

/// One fused result: a chunk with its combined relevance score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedHit {
    pub source: String,
    pub score: f32,
    pub content: String,
    pub metadata: Metadata,
}

/// Rescale scores to [0, 1] by min-max. A constant input (including
/// all-zero) normalizes to all ones: with no spread there is nothing to
/// discriminate on, and dividing a lone candidate's signal away would erase
/// it from fusion entirely.
pub(crate) fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let Some(&first) = scores.first() else {
        return Vec::new();
    };

    let (min, max) = scores
        .iter()
        .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    // Degenerate only on an exactly constant input; any real spread, however
    // small, still discriminates.
    if max == min {
        return vec![1.0; scores.len()];
    }

    scores.iter().map(|&s| (s - min) / (max - min)).collect()
}

/// Combine the two score lists into one ranking.
///
/// Keyword scores cover the whole corpus in chunk order; vector hits cover
/// only the candidate pool. Each list is normalized independently, then
/// joined on the (source, content) pair. A chunk absent from the vector
/// pool contributes 0 on the vector side rather than being excluded.
///
/// Chunks failing the metadata filter are dropped, as are chunks whose
/// fused score is not positive. Ties keep corpus order.
pub(crate) fn fuse_scores(
    chunks: &[SourceDocument],
    keyword_scores: &[f32],
    vector_hits: &[ScoredPoint],
    vector_weight: f32,
    keyword_weight: f32,
    filter: Option<&MetadataFilter>,
    top_k: usize,
) -> Vec<RankedHit> {
    let keyword_norm = min_max_normalize(keyword_scores);

    let vector_raw: Vec<f32> = vector_hits.iter().map(|hit| hit.score).collect();
    let vector_norm = min_max_normalize(&vector_raw);
    let vector_by_key: HashMap<(&str, &str), f32> = vector_hits
        .iter()
        .zip(vector_norm)
        .map(|(hit, score)| {
            (
                (hit.payload.source.as_str(), hit.payload.content.as_str()),
                score,
            )
        })
        .collect();

    let mut ranked: Vec<RankedHit> = chunks
        .iter()
        .zip(keyword_norm)
        .filter(|(chunk, _)| filter.map_or(true, |f| f.matches(&chunk.metadata)))
        .map(|(chunk, keyword_score)| {
            let vector_score = vector_by_key
                .get(&(chunk.source.as_str(), chunk.content.as_str()))
                .copied()
                .unwrap_or(0.0);
            RankedHit {
                source: chunk.source.clone(),
                score: vector_weight * vector_score + keyword_weight * keyword_score,
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
            }
        })
        .filter(|hit| hit.score > 0.0)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_k);
    ranked
}
