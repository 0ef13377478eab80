//! # Dossier Chunker
//!
//! Shared document model and sliding-window chunking for the hybrid
//! retrieval engine.
//!
//! ## Pipeline position
//!
//! ```text
//! Scraped sources (web pages, news items, PDFs)
//!     │
//!     ├──> SourceDocument (uniform text + metadata)
//!     │
//!     └──> chunk_documents
//!          ├─> overlapping fixed-size character windows
//!          ├─> whitespace trimming, empty windows dropped
//!          └─> chunk_index / chunk_count attached to metadata
//! ```
//!
//! Chunks are the atomic unit of embedding, indexing, and retrieval; nothing
//! downstream re-splits them.

mod chunker;
mod document;

pub use chunker::{chunk_documents, chunk_text};
pub use document::{Metadata, MetadataFilter, SourceDocument};
