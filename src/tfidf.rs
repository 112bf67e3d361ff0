//! TF-IDF feature extraction over normalized documents.
//!
//! Weighting follows the usual smoothed scheme: raw counts times
//! `ln((1 + n) / (1 + df)) + 1`, rows L2-normalized over the retained terms.
//! Columns are always in lexicographic term order.

use crate::error::{AnalysisError, AnalysisResult};
use crate::normalize::char_len;
use crate::stopwords::StopWords;
use ahash::AHashMap;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static regex"))
}

/// Splits a document into terms: tokens of 2+ word chars, stop words dropped,
/// then n-grams over the surviving tokens.
#[derive(Clone, Copy, Debug)]
pub struct Analyzer<'a> {
    stopwords: &'a StopWords,
    ngram_range: (usize, usize),
}

impl<'a> Analyzer<'a> {
    pub fn new(stopwords: &'a StopWords, ngram_range: (usize, usize)) -> Self {
        let lo = ngram_range.0.max(1);
        let hi = ngram_range.1.max(lo);
        Self { stopwords, ngram_range: (lo, hi) }
    }

    pub fn tokens(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        token_re()
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !self.stopwords.is_stop(t))
            .map(str::to_string)
            .collect()
    }

    pub fn terms(&self, doc: &str) -> Vec<String> {
        let tokens = self.tokens(doc);
        let (lo, hi) = self.ngram_range;
        let mut out = Vec::with_capacity(tokens.len() * (hi - lo + 1));
        for n in lo..=hi {
            if n == 1 {
                out.extend(tokens.iter().cloned());
                continue;
            }
            for w in tokens.windows(n) {
                out.push(w.join(" "));
            }
        }
        out
    }

    pub fn count_terms(&self, doc: &str) -> AHashMap<String, u32> {
        let mut counts = AHashMap::new();
        for t in self.terms(doc) {
            *counts.entry(t).or_insert(0u32) += 1;
        }
        counts
    }
}

/// How `max_features` picks the retained columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FeatureSelection {
    /// Highest variance of the raw tf-idf weight across documents.
    Variance,
    /// Highest total count across the corpus.
    TermFrequency,
}

#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    /// The combined normalized length must be strictly greater than this.
    pub min_corpus_chars: usize,
    pub selection: FeatureSelection,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_range: (1, 2),
            min_corpus_chars: 10,
            selection: FeatureSelection::Variance,
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = n.max(1);
        self
    }
    pub fn with_ngram_range(mut self, lo: usize, hi: usize) -> Self {
        let lo = lo.max(1);
        self.ngram_range = (lo, hi.max(lo));
        self
    }
    pub fn with_min_corpus_chars(mut self, n: usize) -> Self {
        self.min_corpus_chars = n;
        self
    }
    pub fn with_selection(mut self, selection: FeatureSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Dense document-term matrix. `rows[d][j]` is the weight of `terms[j]` in document `d`.
#[derive(Clone, Debug, Serialize)]
pub struct TfidfMatrix {
    pub terms: Vec<String>,
    pub idf: Vec<f64>,
    pub rows: Vec<Vec<f64>>,
}

impl TfidfMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.terms.len())
    }
    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }
    pub fn n_features(&self) -> usize {
        self.terms.len()
    }
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }
    pub fn weight(&self, doc: usize, term: &str) -> Option<f64> {
        let j = self.term_index(term)?;
        self.rows.get(doc).map(|r| r[j])
    }
    pub fn column(&self, term: &str) -> Option<Vec<f64>> {
        let j = self.term_index(term)?;
        Some(self.rows.iter().map(|r| r[j]).collect())
    }
}

#[derive(Default)]
struct TermStats {
    df: usize,
    total: u64,
    counts: Vec<u32>,
}

pub struct TfidfVectorizer<'a> {
    stopwords: &'a StopWords,
    cfg: ExtractorConfig,
}

impl<'a> TfidfVectorizer<'a> {
    pub fn new(stopwords: &'a StopWords, cfg: ExtractorConfig) -> Self {
        Self { stopwords, cfg }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    pub fn fit_transform<S>(&self, docs: &[S]) -> AnalysisResult<TfidfMatrix>
    where
        S: AsRef<str> + Sync,
    {
        let combined: usize = docs.iter().map(|d| char_len(d.as_ref())).sum();
        if combined <= self.cfg.min_corpus_chars {
            return Err(AnalysisError::InsufficientContent {
                stage: "tfidf",
                found: combined,
                required: self.cfg.min_corpus_chars,
            });
        }

        let analyzer = Analyzer::new(self.stopwords, self.cfg.ngram_range);
        let per_doc: Vec<AHashMap<String, u32>> =
            docs.par_iter().map(|d| analyzer.count_terms(d.as_ref())).collect();

        let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();
        for counts in &per_doc {
            for (term, &c) in counts {
                let s = stats.entry(term.clone()).or_default();
                s.df += 1;
                s.total += c as u64;
                s.counts.push(c);
            }
        }
        if stats.is_empty() {
            return Err(AnalysisError::EmptyVocabulary { stage: "tfidf" });
        }

        let n = docs.len();
        let idf_of = |df: usize| ((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0;

        let mut ranked: Vec<(&String, f64)> = match self.cfg.selection {
            FeatureSelection::TermFrequency => stats.iter().map(|(t, s)| (t, s.total as f64)).collect(),
            FeatureSelection::Variance => stats
                .iter()
                .map(|(t, s)| (t, column_variance(&s.counts, idf_of(s.df), n)))
                .collect(),
        };
        // Stable sort over lexicographic input: equal keys keep term order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.cfg.max_features);
        if ranked.is_empty() {
            return Err(AnalysisError::EmptyVocabulary { stage: "tfidf" });
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.clone()).collect();
        terms.sort();
        let idf: Vec<f64> = terms.iter().map(|t| idf_of(stats[t].df)).collect();

        let rows: Vec<Vec<f64>> = per_doc
            .par_iter()
            .map(|counts| {
                let mut row: Vec<f64> = terms
                    .iter()
                    .zip(&idf)
                    .map(|(t, w)| counts.get(t).map_or(0.0, |&c| c as f64 * w))
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        tracing::debug!(docs = n, vocabulary = stats.len(), features = terms.len(), "tf-idf fitted");
        Ok(TfidfMatrix { terms, idf, rows })
    }
}

/// Population variance of `count * idf` over `n` documents, zeros implied for
/// documents without the term. Values are summed in sorted order so the result
/// does not depend on document order.
fn column_variance(counts: &[u32], idf: f64, n: usize) -> f64 {
    let mut vals: Vec<f64> = counts.iter().map(|&c| c as f64 * idf).collect();
    vals.sort_by(f64::total_cmp);
    let nf = n as f64;
    let mean = vals.iter().sum::<f64>() / nf;
    let mut sq: Vec<f64> = vals.iter().map(|v| (v - mean) * (v - mean)).collect();
    sq.sort_by(f64::total_cmp);
    let zeros = (n - vals.len()) as f64;
    (sq.iter().sum::<f64>() + zeros * mean * mean) / nf
}

pub(crate) fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

pub(crate) fn rank_desc_then_term<'t>(a: (&'t str, f64), b: (&'t str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
