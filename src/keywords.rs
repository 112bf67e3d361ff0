//! Keyword ranking inside one merged document, and word-frequency tables.
//!
//! This is a different operation from [`crate::tfidf`]: there is a single
//! document, so idf is constant and the ranking reduces to term counts.

use crate::error::{AnalysisError, AnalysisResult};
use crate::normalize::char_len;
use crate::stopwords::StopWords;
use crate::tfidf::{l2_normalize, rank_desc_then_term, Analyzer};
use ahash::AHashMap;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct KeywordConfig {
    /// Trimmed merged text must have at least this many characters.
    pub min_chars: usize,
    pub max_features: usize,
    pub top_n: usize,
    pub ngram_range: (usize, usize),
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self { min_chars: 100, max_features: 100, top_n: 15, ngram_range: (1, 2) }
    }
}

impl KeywordConfig {
    pub fn with_min_chars(mut self, n: usize) -> Self {
        self.min_chars = n;
        self
    }
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n.max(1);
        self
    }
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = n.max(1);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f64,
}

pub fn extract_keywords(text: &str, stopwords: &StopWords, cfg: &KeywordConfig) -> AnalysisResult<Vec<Keyword>> {
    let found = char_len(text.trim());
    if found < cfg.min_chars {
        return Err(AnalysisError::InsufficientContent { stage: "keywords", found, required: cfg.min_chars });
    }
    let counts = Analyzer::new(stopwords, cfg.ngram_range).count_terms(text);
    if counts.is_empty() {
        return Err(AnalysisError::EmptyVocabulary { stage: "keywords" });
    }

    let mut ranked: Vec<(&str, f64)> = counts.iter().map(|(t, &c)| (t.as_str(), c as f64)).collect();
    ranked.sort_by(|a, b| rank_desc_then_term(*a, *b));
    ranked.truncate(cfg.max_features);

    let mut weights: Vec<f64> = ranked.iter().map(|(_, c)| *c).collect();
    l2_normalize(&mut weights);

    Ok(ranked
        .into_iter()
        .zip(weights)
        .take(cfg.top_n)
        .map(|((term, _), weight)| Keyword { term: term.to_string(), weight })
        .collect())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
    /// Count relative to the most frequent word (1.0 for the top word).
    pub relative: f64,
}

/// Unigram frequencies over all texts, stop words removed, most frequent first.
pub fn word_frequencies<S: AsRef<str>>(texts: &[S], stopwords: &StopWords, max_words: usize) -> Vec<WordFrequency> {
    let analyzer = Analyzer::new(stopwords, (1, 1));
    let mut counts: AHashMap<String, u64> = AHashMap::new();
    for t in texts {
        for tok in analyzer.tokens(t.as_ref()) {
            *counts.entry(tok).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, f64)> = counts.iter().map(|(w, &c)| (w.as_str(), c as f64)).collect();
    ranked.sort_by(|a, b| rank_desc_then_term(*a, *b));
    ranked.truncate(max_words);

    let top = ranked.first().map(|(_, c)| *c).unwrap_or(1.0);
    ranked
        .into_iter()
        .map(|(w, c)| WordFrequency { word: w.to_string(), count: c as u64, relative: c / top })
        .collect()
}
