use std::collections::HashMap;

/// Term-frequency saturation parameter.
const K1: f32 = 1.5;
/// Document-length normalization parameter.
const B: f32 = 0.75;
/// Floor applied to negative IDF values, as a fraction of the average IDF.
const EPSILON: f32 = 0.25;

/// Okapi BM25 ranking structure over a fixed corpus snapshot.
///
/// Built once per ingestion over every chunk's content; `scores` then ranks
/// a query against the entire corpus. The index is read-only after `fit`,
/// so concurrent queries can share a reference freely.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    /// Per-document term frequencies, in corpus order
    doc_freqs: Vec<HashMap<String, usize>>,
    /// Per-term inverse document frequency
    idf: HashMap<String, f32>,
    /// Per-document token counts, in corpus order
    doc_lens: Vec<usize>,
    /// Average document length in tokens
    avgdl: f32,
}

/// Lowercase whitespace tokenization. No stemming, no stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

impl Bm25Index {
    /// Build the index over `corpus` (one entry per chunk, corpus order).
    ///
    /// An empty corpus produces a valid index whose `scores` output is
    /// empty; callers treat that as "zero relevance everywhere".
    #[must_use]
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Self {
        let doc_tokens: Vec<Vec<String>> =
            corpus.iter().map(|text| tokenize(text.as_ref())).collect();

        let doc_lens: Vec<usize> = doc_tokens.iter().map(Vec::len).collect();
        let total_tokens: usize = doc_lens.iter().sum();
        let avgdl = if doc_tokens.is_empty() {
            0.0
        } else {
            total_tokens as f32 / doc_tokens.len() as f32
        };

        // Document frequency per term.
        let mut term_doc_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freqs = Vec::with_capacity(doc_tokens.len());
        for tokens in &doc_tokens {
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *term_doc_counts.entry(term.clone()).or_insert(0) += 1;
            }
            doc_freqs.push(freqs);
        }

        let idf = Self::compute_idf(&term_doc_counts, doc_tokens.len());

        log::debug!(
            "BM25 index fitted: {} documents, {} distinct terms, avgdl {:.1}",
            doc_freqs.len(),
            idf.len(),
            avgdl
        );

        Self {
            doc_freqs,
            idf,
            doc_lens,
            avgdl,
        }
    }

    /// Okapi IDF with the standard negative-IDF correction: rare terms in
    /// tiny corpora can produce negative raw IDF, which is floored at
    /// `EPSILON` times the average IDF so common terms still contribute a
    /// small positive signal.
    fn compute_idf(term_doc_counts: &HashMap<String, usize>, corpus_size: usize) -> HashMap<String, f32> {
        let n = corpus_size as f32;
        let mut idf: HashMap<String, f32> = HashMap::with_capacity(term_doc_counts.len());
        let mut idf_sum = 0.0f32;
        let mut negative: Vec<String> = Vec::new();

        for (term, &doc_count) in term_doc_counts {
            let df = doc_count as f32;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        if !idf.is_empty() {
            let average_idf = idf_sum / idf.len() as f32;
            let floor = EPSILON * average_idf;
            for term in negative {
                idf.insert(term, floor);
            }
        }

        idf
    }

    /// Score `query` against every corpus document, in corpus order.
    ///
    /// A query with no recognizable tokens, or with only out-of-vocabulary
    /// tokens, scores zero everywhere; that is an expected condition, not an
    /// error.
    #[must_use]
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let query_tokens = tokenize(query);
        let mut scores = vec![0.0f32; self.doc_freqs.len()];

        if query_tokens.is_empty() || self.avgdl == 0.0 {
            return scores;
        }

        for token in &query_tokens {
            let Some(&idf) = self.idf.get(token) else {
                continue;
            };
            for (doc_idx, freqs) in self.doc_freqs.iter().enumerate() {
                let tf = freqs.get(token).copied().unwrap_or(0) as f32;
                if tf == 0.0 {
                    continue;
                }
                let dl = self.doc_lens[doc_idx] as f32;
                let denom = tf + K1 * (1.0 - B + B * dl / self.avgdl);
                scores[doc_idx] += idf * tf * (K1 + 1.0) / denom;
            }
        }

        scores
    }

    /// Number of documents in the corpus snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doc_freqs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc_freqs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_corpus_scores_nothing() {
        let index = Bm25Index::fit::<&str>(&[]);
        assert!(index.is_empty());
        assert_eq!(index.scores("anything"), Vec::<f32>::new());
    }

    #[test]
    fn scores_are_in_corpus_order() {
        let index = Bm25Index::fit(&[
            "rust programming",
            "python scripting",
            "rust rust systems",
        ]);

        let scores = index.scores("rust");
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert!(scores[2] > scores[0], "repeated term should score higher");
    }

    #[test]
    fn tokenization_is_case_insensitive() {
        let index = Bm25Index::fit(&["Rust Programming Language", "python snake", "go gopher"]);
        let lower = index.scores("rust");
        let upper = index.scores("RUST");
        assert_eq!(lower, upper);
        assert!(lower[0] > 0.0);
        assert_eq!(lower[1], 0.0);
    }

    #[test]
    fn empty_query_scores_zero_everywhere() {
        let index = Bm25Index::fit(&["some content", "other content"]);
        assert_eq!(index.scores(""), vec![0.0, 0.0]);
        assert_eq!(index.scores("   \t"), vec![0.0, 0.0]);
    }

    #[test]
    fn out_of_vocabulary_terms_contribute_nothing() {
        let index = Bm25Index::fit(&["alpha beta", "beta gamma", "beta delta"]);
        assert_eq!(index.scores("zeppelin"), vec![0.0, 0.0, 0.0]);

        // Mixed query: only the known token scores.
        let mixed = index.scores("zeppelin alpha");
        assert!(mixed[0] > 0.0);
        assert_eq!(mixed[1], 0.0);
        assert_eq!(mixed[2], 0.0);
    }

    #[test]
    fn common_terms_keep_a_positive_floor() {
        // "shared" appears in every document, giving it a negative raw IDF;
        // with enough rare terms the average IDF stays positive, so the
        // epsilon floor keeps the common term's contribution positive too.
        let index = Bm25Index::fit(&[
            "shared alpha beta",
            "shared gamma delta",
            "shared epsilon zeta",
            "shared eta theta",
        ]);

        let scores = index.scores("shared");
        assert!(scores.iter().all(|&s| s > 0.0), "scores: {scores:?}");
    }

    #[test]
    fn length_normalization_favors_shorter_documents() {
        // Same single occurrence of the term; the much longer document is
        // penalized by the dl/avgdl factor.
        let index = Bm25Index::fit(&[
            "target",
            "target plus quite a few additional padding tokens here now",
            "unrelated filler words",
        ]);

        let scores = index.scores("target");
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > 0.0);
        assert_eq!(scores[2], 0.0);
    }

    proptest! {
        /// Scores are always finite and line up one-to-one with the corpus.
        #[test]
        fn scores_match_corpus_shape(
            corpus in proptest::collection::vec("[a-z ]{0,40}", 0..12),
            query in "[a-z ]{0,20}",
        ) {
            let index = Bm25Index::fit(&corpus);
            let scores = index.scores(&query);
            prop_assert_eq!(scores.len(), corpus.len());
            for score in scores {
                prop_assert!(score.is_finite());
            }
        }
    }
}
