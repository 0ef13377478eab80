//! Similarity index for document chunks.
//!
//! Two interchangeable backends sit behind [`VectorIndex`]:
//!
//! - a remote Qdrant collection (cosine distance, payload filters pushed
//!   server-side), used when a service URL is configured and reachable;
//! - an in-memory brute-force scan, used otherwise.
//!
//! A remote connection failure at construction demotes the index to the
//! local backend for its whole lifetime. The demotion is logged and
//! observable through [`BackendKind`].
//!
//! Embeddings come from an [`EmbeddingProvider`]; the deterministic
//! [`HashEmbedder`] serves tests and offline runs.

mod embed;
mod error;
mod index;
mod local;
mod remote;
mod types;

pub use embed::{EmbeddingProvider, HashEmbedder};
pub use error::{Result, VectorIndexError};
pub use index::{BackendKind, VectorIndex, VectorIndexConfig};
pub use local::cosine_similarity;
pub use types::{IndexedPoint, PointPayload, ScoredPoint};
