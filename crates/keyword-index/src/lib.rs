//! # Dossier Keyword Index
//!
//! Okapi BM25 lexical scoring over the chunk corpus.
//!
//! Tokenization is deliberately minimal: lowercase, split on whitespace, no
//! stemming, no stop words. That keeps scores deterministic and reproducible
//! across runs, which the fusion stage and its tests depend on.

mod bm25;

pub use bm25::Bm25Index;
