//! What to ask the upstream source for, plus normalization helpers.

/// Community + search term + maximum count. Strings are stored normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchQuery {
    pub subreddit: String,  // lowercase, no "r/"
    pub search: String,     // lowercase, trimmed; empty matches everything
    pub limit: usize,
    pub include_comments: bool,
}

impl FetchQuery {
    pub fn new(subreddit: impl AsRef<str>, search: impl AsRef<str>, limit: usize) -> Self {
        Self {
            subreddit: normalize_str(subreddit.as_ref()),
            search: search.as_ref().trim().to_lowercase(),
            limit,
            include_comments: false,
        }
    }

    pub fn with_comments(mut self, yes: bool) -> Self {
        self.include_comments = yes;
        self
    }
}

#[inline]
pub fn normalize_str(s: &str) -> String {
    let s = s.trim().to_lowercase();
    if let Some(rest) = s.strip_prefix("r/") { rest.to_string() } else { s }
}
