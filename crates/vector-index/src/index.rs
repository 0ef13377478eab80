use std::time::Duration;

use crate::error::{Result, VectorIndexError};
use crate::local::LocalIndex;
use crate::remote::RemoteIndex;
use crate::types::ScoredPoint;
use dossier_chunker::{MetadataFilter, SourceDocument};

/// Connection settings for the remote backend. `remote_url: None` selects
/// the local backend outright.
#[derive(Debug, Clone)]
pub struct VectorIndexConfig {
    pub remote_url: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
    pub request_timeout: Duration,
}

/// Which backend ended up serving the index. Decided once at construction
/// and never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

enum Backend {
    Remote(RemoteIndex),
    Local(LocalIndex),
}

/// Similarity index facade. Both backends speak the same (vector, payload)
/// contract with cosine scores, so callers never branch on the backend.
///
/// Backend choice happens here: a configured remote service is tried first,
/// and any connection or collection-setup failure demotes the index to the
/// in-memory backend for its whole lifetime. The demotion is logged and
/// observable through [`BackendKind`], never silent.
pub struct VectorIndex {
    backend: Backend,
    dimension: usize,
}

impl VectorIndex {
    /// Construct the index, picking the backend. Infallible: remote
    /// failures fall back to the local backend instead of erroring.
    pub async fn connect(config: &VectorIndexConfig, dimension: usize) -> Self {
        let backend = match config.remote_url.as_deref() {
            Some(url) => {
                match RemoteIndex::connect(
                    url,
                    config.api_key.as_deref(),
                    config.request_timeout,
                    &config.collection,
                    dimension,
                )
                .await
                {
                    Ok(remote) => {
                        log::info!("Connected to vector backend at {url}");
                        Backend::Remote(remote)
                    }
                    Err(err) => {
                        log::warn!(
                            "Vector backend at {url} unavailable, using in-memory index: {err}"
                        );
                        Backend::Local(LocalIndex::new(dimension))
                    }
                }
            }
            None => {
                log::debug!("No vector backend configured, using in-memory index");
                Backend::Local(LocalIndex::new(dimension))
            }
        };

        Self { backend, dimension }
    }

    #[must_use]
    pub const fn backend_kind(&self) -> BackendKind {
        match self.backend {
            Backend::Remote(_) => BackendKind::Remote,
            Backend::Local(_) => BackendKind::Local,
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Insert one point per (document, vector) pair. Counts must agree and
    /// every vector must match the index dimensionality.
    pub async fn upsert(
        &mut self,
        docs: &[SourceDocument],
        vectors: &[Vec<f32>],
    ) -> Result<usize> {
        if docs.len() != vectors.len() {
            return Err(VectorIndexError::CountMismatch {
                documents: docs.len(),
                vectors: vectors.len(),
            });
        }
        if docs.is_empty() {
            return Ok(0);
        }

        match &mut self.backend {
            Backend::Remote(remote) => remote.upsert(docs, vectors).await,
            Backend::Local(local) => local.upsert(docs, vectors),
        }
    }

    /// Top `top_k` cosine neighbors of `query_vector`, filter applied
    /// before ranking.
    pub async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        match &self.backend {
            Backend::Remote(remote) => remote.search(query_vector, top_k, filter).await,
            Backend::Local(local) => local.search(query_vector, top_k, filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_chunker::Metadata;
    use pretty_assertions::assert_eq;

    fn config_without_remote() -> VectorIndexConfig {
        VectorIndexConfig {
            remote_url: None,
            api_key: None,
            collection: "test_chunks".to_string(),
            request_timeout: Duration::from_secs(1),
        }
    }

    fn doc(source: &str, content: &str) -> SourceDocument {
        SourceDocument::new(
            source.to_string(),
            "news_article".to_string(),
            content.to_string(),
            Metadata::new(),
        )
    }

    #[tokio::test]
    async fn no_remote_url_selects_local_backend() {
        let index = VectorIndex::connect(&config_without_remote(), 4).await;
        assert_eq!(index.backend_kind(), BackendKind::Local);
        assert_eq!(index.dimension(), 4);
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_to_local() {
        let config = VectorIndexConfig {
            remote_url: Some("http://127.0.0.1:1".to_string()),
            ..config_without_remote()
        };

        let mut index = VectorIndex::connect(&config, 2).await;
        assert_eq!(index.backend_kind(), BackendKind::Local);

        // The demoted index still serves traffic.
        let docs = vec![doc("a", "text")];
        index.upsert(&docs, &[vec![1.0, 0.0]]).await.unwrap();
        let hits = index.search(&[1.0, 0.0], 1, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.source, "a");
    }

    #[tokio::test]
    async fn upsert_rejects_count_mismatch() {
        let mut index = VectorIndex::connect(&config_without_remote(), 2).await;
        let docs = vec![doc("a", "one"), doc("b", "two")];

        let err = index.upsert(&docs, &[vec![1.0, 0.0]]).await.unwrap_err();
        assert!(matches!(
            err,
            VectorIndexError::CountMismatch {
                documents: 2,
                vectors: 1
            }
        ));
    }

    #[tokio::test]
    async fn empty_upsert_is_a_noop() {
        let mut index = VectorIndex::connect(&config_without_remote(), 2).await;
        assert_eq!(index.upsert(&[], &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn zero_top_k_returns_empty() {
        let mut index = VectorIndex::connect(&config_without_remote(), 2).await;
        let docs = vec![doc("a", "text")];
        index.upsert(&docs, &[vec![1.0, 0.0]]).await.unwrap();

        let hits = index.search(&[1.0, 0.0], 0, None).await.unwrap();
        assert!(hits.is_empty());
    }
}
