//! Immutable stop-word sets, built once at startup and passed by reference.

use crate::normalize::normalize_text;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Deref;
use std::path::Path;

const PORTUGUESE: &str = include_str!("stopwords/portuguese.txt");

/// Community-specific fillers that dominate every thread without saying anything.
pub const DOMAIN_EXTRAS: &[&str] = &[
    "tcc", "pra", "tô", "aqui", "lá", "pro", "ser", "ter", "fazer", "coisa", "alguém",
    "ainda", "sobre", "tudo", "sei", "só", "post", "trabalho", "curso", "q", "vc",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct StopWords(BTreeSet<String>);

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in Portuguese list (the common NLTK corpus), compiled into the binary.
    pub fn portuguese() -> Self {
        Self::from_words(PORTUGUESE.lines())
    }

    /// Words pass through the text normalizer so they match extractor tokens.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for w in words {
            let n = normalize_text(w.as_ref());
            if !n.is_empty() {
                set.insert(n);
            }
        }
        Self(set)
    }

    /// One word per line; blank lines and lines starting with `#` are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open stop-word list {}", path.display()))?;
        let mut words = Vec::new();
        for line in BufReader::new(f).lines() {
            let line = line?;
            let t = line.trim();
            if t.is_empty() || t.starts_with('#') {
                continue;
            }
            words.push(t.to_string());
        }
        Ok(Self::from_words(words))
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.0.extend(Self::from_words(words).0);
        self
    }

    pub fn with_domain_extras(self) -> Self {
        self.with_words(DOMAIN_EXTRAS.iter().copied())
    }

    /// Merge extras from the environment:
    /// - SUBMINER_EXTRA_STOPWORDS: comma/semicolon/space separated words
    /// - SUBMINER_STOPWORDS_FILE: path to a newline-separated list
    pub fn with_env_extras(self) -> Self {
        let mut out = self;
        if let Ok(s) = std::env::var("SUBMINER_EXTRA_STOPWORDS") {
            let extra: Vec<&str> = s
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter(|w| !w.is_empty())
                .collect();
            out = out.with_words(extra);
        }
        if let Ok(path) = std::env::var("SUBMINER_STOPWORDS_FILE") {
            if !path.trim().is_empty() {
                match Self::load(Path::new(&path)) {
                    Ok(extra) => out.0.extend(extra.0),
                    Err(e) => tracing::warn!("SUBMINER_STOPWORDS_FILE is set but cannot be read: {:#}", e),
                }
            }
        }
        out
    }

    #[inline]
    pub fn is_stop(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl Deref for StopWords {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
