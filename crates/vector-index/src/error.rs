use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorIndexError>;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// A vector's length disagrees with the dimensionality fixed at
    /// construction. This is a configuration error and surfaces at
    /// ingestion, never at query time.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Upsert count mismatch: {documents} documents but {vectors} vectors")]
    CountMismatch { documents: usize, vectors: usize },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("{0}")]
    Other(String),
}
