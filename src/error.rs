//! Error taxonomy shared by the extractor, the consumers and the pipelines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The upstream source returned no posts. Fatal to a run.
    #[error("no posts found in r/{subreddit} for query {query:?}; check the query, subreddit or data directory")]
    EmptyResult { subreddit: String, query: String },

    /// The corpus for `stage` is below its minimum content threshold.
    #[error("{stage}: insufficient content ({found} chars, more than {required} required)")]
    InsufficientContent { stage: &'static str, found: usize, required: usize },

    /// Every token of the corpus was a stop word (or too short).
    #[error("{stage}: no terms left after stop-word removal")]
    EmptyVocabulary { stage: &'static str },

    #[error("cannot form {k} clusters from {samples} samples")]
    InvalidClusterCount { k: usize, samples: usize },

    #[error("{algorithm} did not converge in {iterations} iterations")]
    NoConvergence { algorithm: &'static str, iterations: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    /// True for conditions that skip one analysis step but leave the run alive.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientContent { .. }
                | AnalysisError::EmptyVocabulary { .. }
                | AnalysisError::InvalidClusterCount { .. }
                | AnalysisError::NoConvergence { .. }
        )
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
