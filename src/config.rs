use crate::date::YearMonth;
use crate::query::normalize_str;
use std::path::{Path, PathBuf};

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    pub base_dir: PathBuf,
    pub comments_dir: PathBuf,
    pub submissions_dir: PathBuf,
    pub subreddit: String,            // normalized lowercase, no "r/"
    pub search: String,               // plain search term; empty matches every post
    pub limit: usize,                 // maximum posts per fetch
    pub start: Option<YearMonth>,     // inclusive
    pub end: Option<YearMonth>,       // inclusive
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub progress: bool,               // show progress bar while scanning the corpus
    pub progress_label: Option<String>,
    pub out_dir: Option<PathBuf>,     // reports/exports; None disables sinks
    pub seed: u64,                    // clustering seed

    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        let base = PathBuf::from("../reddit");
        Self {
            comments_dir: base.join("comments"),
            submissions_dir: base.join("submissions"),
            base_dir: base,
            subreddit: "faculdadebr".to_string(),
            search: "tcc".to_string(),
            limit: 150,
            start: None,
            end: None,
            parallelism: None,
            progress: true,
            progress_label: None,
            out_dir: None,
            seed: 42,
            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl AnalysisOptions {
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref().to_path_buf();
        self.comments_dir = base.join("comments");
        self.submissions_dir = base.join("submissions");
        self.base_dir = base;
        self
    }
    pub fn with_subreddit(mut self, sub: impl AsRef<str>) -> Self {
        self.subreddit = normalize_str(sub.as_ref());
        self
    }
    pub fn with_search(mut self, term: impl AsRef<str>) -> Self {
        self.search = term.as_ref().trim().to_string();
        self
    }
    pub fn with_limit(mut self, n: usize) -> Self {
        self.limit = n.max(1);
        self
    }
    pub fn with_date_range(mut self, start: Option<YearMonth>, end: Option<YearMonth>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = Some(dir.as_ref().to_path_buf());
        self
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }

    /// Apply SUBMINER_BASE_DIR, SUBMINER_OUT_DIR, SUBMINER_SUBREDDIT,
    /// SUBMINER_QUERY and SUBMINER_LIMIT when set. Unparsable values are
    /// logged and ignored.
    pub fn with_env_overrides(self) -> Self {
        let mut o = self;
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        if let Some(v) = var("SUBMINER_BASE_DIR") { o = o.with_base_dir(v); }
        if let Some(v) = var("SUBMINER_OUT_DIR") { o = o.with_out_dir(v); }
        if let Some(v) = var("SUBMINER_SUBREDDIT") { o = o.with_subreddit(v); }
        if let Some(v) = var("SUBMINER_QUERY") { o = o.with_search(v); }
        if let Some(v) = var("SUBMINER_LIMIT") {
            match v.trim().parse::<usize>() {
                Ok(n) => o = o.with_limit(n),
                Err(_) => tracing::warn!("SUBMINER_LIMIT is not a number: {v}"),
            }
        }
        o
    }
}
