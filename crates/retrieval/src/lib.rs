//! Hybrid retrieval over scraped-document corpora.
//!
//! ```text
//!            ingest                              retrieve
//!   documents --> chunker --> embedder     query --> embedder
//!                    |            |                     |
//!                    v            v                     v
//!               BM25 index   vector index --------> candidates
//!                    |                                  |
//!                    +-------> score fusion <-----------+
//!                                   |
//!                                   v
//!                              ranked hits
//! ```
//!
//! Both signals are min-max normalized per query and combined as a weighted
//! sum (vector-heavy by default), so results surface both semantic matches
//! the keywords miss and exact terms the embedding space smears out.

mod config;
mod engine;
mod error;
mod fusion;

pub use config::RetrievalConfig;
pub use engine::RetrievalEngine;
pub use error::{Result, RetrievalError};
pub use fusion::RankedHit;

// The full public surface in one crate for downstream callers.
pub use dossier_chunker::{Metadata, MetadataFilter, SourceDocument};
pub use dossier_vector_index::{BackendKind, EmbeddingProvider, HashEmbedder};
