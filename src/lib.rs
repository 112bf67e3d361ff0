mod config;
mod date;
mod error;
mod paths;
mod query;
mod record;
mod zstd_jsonl;

mod filters;
mod progress;
mod source;
mod util;

pub mod normalize;
pub mod stopwords;
pub mod tfidf;
pub mod keywords;

pub mod kmeans;
pub mod scale;
pub mod stats;
pub mod graph;
pub mod centrality;
pub mod community;

mod export;
mod report;
mod pipeline;

pub use crate::config::AnalysisOptions;
pub use crate::date::{day_of_week, hour_of_day, rfc3339, YearMonth};
pub use crate::error::{AnalysisError, AnalysisResult};
pub use crate::pipeline::{
    author_texts, Analysis, ColumnSummary, CommunityReport, CommunitySummary, Correlation, KddReport, MissingCount,
    NodeScore, PostNetworkReport, ProfileCluster, SamplePost, TextMiningReport, TopicCluster,
};
pub use crate::query::FetchQuery;
pub use crate::record::{Comment, Corpus, Parent, Post, NO_FLAIR, UNKNOWN_AUTHOR};
pub use crate::source::{DumpSource, MemorySource, PostSource};

pub use crate::normalize::{normalize_opt, normalize_text, normalize_value};
pub use crate::stopwords::StopWords;
pub use crate::tfidf::{ExtractorConfig, FeatureSelection, TfidfMatrix, TfidfVectorizer};
pub use crate::keywords::{extract_keywords, word_frequencies, Keyword, KeywordConfig};

// Sinks, so binaries can export without running a pipeline.
pub use crate::export::{write_csv, NetworkRow, PostRow};
pub use crate::report::{emit, write_json, Diagnostic, Diagnostics};

pub use crate::progress::{make_count_progress, make_progress_bar_labeled};
pub use crate::util::{create_with_backoff, init_tracing_once, open_with_backoff, replace_file_atomic_backoff};
