use std::env;
use std::str::FromStr;
use std::time::Duration;

use dossier_vector_index::VectorIndexConfig;

use crate::error::{Result, RetrievalError};

/// Engine settings. `Default` gives a fully offline engine (in-memory
/// vector backend); `from_env` layers `DOSSIER_*` overrides on top.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Remote vector service URL. `None` selects the in-memory backend.
    pub remote_url: Option<String>,
    /// API key for the remote vector service.
    pub api_key: Option<String>,
    /// Collection name on the remote backend.
    pub collection: String,
    /// Per-request timeout against the remote backend, in seconds.
    pub request_timeout_secs: u64,

    /// Chunk window size in characters. 0 disables splitting.
    pub max_chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,

    /// Weight of the normalized vector score in fusion.
    pub vector_weight: f32,
    /// Weight of the normalized keyword score in fusion.
    pub keyword_weight: f32,
    /// Lower bound on the vector candidate pool, regardless of `top_k`.
    pub min_candidate_pool: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            api_key: None,
            collection: "dossier_chunks".to_string(),
            request_timeout_secs: 20,
            max_chunk_size: 800,
            chunk_overlap: 120,
            vector_weight: 0.7,
            keyword_weight: 0.3,
            min_candidate_pool: 12,
        }
    }
}

impl RetrievalConfig {
    /// Defaults overridden by `DOSSIER_*` environment variables. Unset
    /// variables keep the default; set-but-unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            remote_url: env::var("DOSSIER_QDRANT_URL").ok().filter(|v| !v.is_empty()),
            api_key: env::var("DOSSIER_QDRANT_API_KEY").ok().filter(|v| !v.is_empty()),
            collection: env::var("DOSSIER_COLLECTION").unwrap_or(defaults.collection),
            request_timeout_secs: env_parse("DOSSIER_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            max_chunk_size: env_parse("DOSSIER_MAX_CHUNK_SIZE")?
                .unwrap_or(defaults.max_chunk_size),
            chunk_overlap: env_parse("DOSSIER_CHUNK_OVERLAP")?.unwrap_or(defaults.chunk_overlap),
            vector_weight: env_parse("DOSSIER_VECTOR_WEIGHT")?.unwrap_or(defaults.vector_weight),
            keyword_weight: env_parse("DOSSIER_KEYWORD_WEIGHT")?
                .unwrap_or(defaults.keyword_weight),
            min_candidate_pool: env_parse("DOSSIER_MIN_CANDIDATE_POOL")?
                .unwrap_or(defaults.min_candidate_pool),
        })
    }

    /// Reject settings the engine cannot operate under. Called once at
    /// engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.collection.is_empty() {
            return Err(RetrievalError::InvalidConfig(
                "collection name must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(RetrievalError::InvalidConfig(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        for (name, weight) in [
            ("vector_weight", self.vector_weight),
            ("keyword_weight", self.keyword_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RetrievalError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {weight}"
                )));
            }
        }
        if self.vector_weight + self.keyword_weight == 0.0 {
            return Err(RetrievalError::InvalidConfig(
                "at least one fusion weight must be positive".to_string(),
            ));
        }
        if self.min_candidate_pool == 0 {
            return Err(RetrievalError::InvalidConfig(
                "candidate pool floor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn vector_index_config(&self) -> VectorIndexConfig {
        VectorIndexConfig {
            remote_url: self.remote_url.clone(),
            api_key: self.api_key.clone(),
            collection: self.collection.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            RetrievalError::InvalidConfig(format!("{key} has unparsable value '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_offline_and_valid() {
        let config = RetrievalConfig::default();
        assert_eq!(config.remote_url, None);
        assert_eq!(config.max_chunk_size, 800);
        assert_eq!(config.chunk_overlap, 120);
        assert!((config.vector_weight - 0.7).abs() < f32::EPSILON);
        assert!((config.keyword_weight - 0.3).abs() < f32::EPSILON);
        config.validate().unwrap();
    }

    #[test]
    fn negative_weight_is_rejected() {
        let config = RetrievalConfig {
            keyword_weight: -0.1,
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let config = RetrievalConfig {
            vector_weight: 0.0,
            keyword_weight: 0.0,
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = RetrievalConfig {
            request_timeout_secs: 0,
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_candidate_pool_is_rejected() {
        let config = RetrievalConfig {
            min_candidate_pool: 0,
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn env_overrides_candidate_pool() {
        env::set_var("DOSSIER_MIN_CANDIDATE_POOL", "24");
        let config = RetrievalConfig::from_env().unwrap();
        env::remove_var("DOSSIER_MIN_CANDIDATE_POOL");

        assert_eq!(config.min_candidate_pool, 24);
        config.validate().unwrap();
    }

    #[test]
    fn empty_collection_is_rejected() {
        let config = RetrievalConfig {
            collection: String::new(),
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }
}
