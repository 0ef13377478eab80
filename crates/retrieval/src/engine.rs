use std::sync::Arc;

use dossier_chunker::{chunk_documents, MetadataFilter, SourceDocument};
use dossier_keyword_index::Bm25Index;
use dossier_vector_index::{BackendKind, EmbeddingProvider, VectorIndex};

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::fusion::{fuse_scores, RankedHit};

/// The hybrid retrieval engine: chunking, embedding, vector and keyword
/// indexing behind two operations, `ingest` and `retrieve`.
///
/// Ingestion takes `&mut self` and queries take `&self`, so the borrow
/// checker enforces the engine's concurrency contract directly: queries may
/// run in parallel against a quiescent engine, writes are exclusive.
pub struct RetrievalEngine {
    config: RetrievalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_index: VectorIndex,
    keyword_index: Bm25Index,
    chunks: Vec<SourceDocument>,
}

impl RetrievalEngine {
    /// Validate the config and bring up the vector backend. Never fails on
    /// an unreachable remote; that case demotes to the in-memory backend.
    pub async fn connect(
        config: RetrievalConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let vector_index =
            VectorIndex::connect(&config.vector_index_config(), embedder.dimension()).await;

        Ok(Self {
            config,
            embedder,
            vector_index,
            keyword_index: Bm25Index::fit::<String>(&[]),
            chunks: Vec::new(),
        })
    }

    /// Chunk, embed and index `documents`. Returns the number of chunks
    /// added. Documents that chunk to nothing are skipped; an all-empty
    /// batch is a no-op, not an error.
    ///
    /// The keyword index is refitted over the whole corpus afterwards,
    /// since BM25 statistics are global.
    pub async fn ingest(&mut self, documents: &[SourceDocument]) -> Result<usize> {
        let new_chunks = chunk_documents(
            documents,
            self.config.max_chunk_size,
            self.config.chunk_overlap,
        );
        if new_chunks.is_empty() {
            log::debug!("Ingest produced no chunks from {} documents", documents.len());
            return Ok(0);
        }

        let texts: Vec<String> = new_chunks
            .iter()
            .map(|chunk| chunk.content.clone())
            .collect();
        let vectors = self.embedder.embed_texts(&texts).await?;
        let added = self.vector_index.upsert(&new_chunks, &vectors).await?;

        self.chunks.extend(new_chunks);
        let corpus: Vec<&str> = self
            .chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect();
        self.keyword_index = Bm25Index::fit(&corpus);

        log::info!(
            "Ingested {added} chunks from {} documents ({} total)",
            documents.len(),
            self.chunks.len()
        );
        Ok(added)
    }

    /// Rank the corpus against `query` and return at most `top_k` fused
    /// hits, best first.
    ///
    /// The vector side is over-fetched to `max(top_k * 2, pool floor)`
    /// candidates so fusion has lexical-only and vector-only chunks to
    /// arbitrate between. The metadata filter is applied on both paths;
    /// re-applying it during fusion also covers filter conditions the
    /// remote backend could not express server-side.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RankedHit>> {
        if top_k == 0 || self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query).await?;
        let pool = usize::max(top_k * 2, self.config.min_candidate_pool);
        let vector_hits = self.vector_index.search(&query_vector, pool, filter).await?;
        let keyword_scores = self.keyword_index.scores(query);

        let ranked = fuse_scores(
            &self.chunks,
            &keyword_scores,
            &vector_hits,
            self.config.vector_weight,
            self.config.keyword_weight,
            filter,
            top_k,
        );
        log::debug!(
            "Query ranked {} of {} chunks ({} vector candidates)",
            ranked.len(),
            self.chunks.len(),
            vector_hits.len()
        );
        Ok(ranked)
    }

    /// Which vector backend this engine ended up on.
    #[must_use]
    pub const fn backend_kind(&self) -> BackendKind {
        self.vector_index.backend_kind()
    }

    /// Total chunks indexed so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
