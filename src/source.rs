//! Upstream data sources. Retrieval from the live platform is out of scope;
//! the shipped source reads a local monthly dump corpus.

use crate::config::AnalysisOptions;
use crate::date::YearMonth;
use crate::filters::{bounds_tuple, matches_submission, within_bounds};
use crate::paths::{plan_files, FileJob, FileKind};
use crate::progress::{make_progress_bar_labeled, total_compressed_size};
use crate::query::FetchQuery;
use crate::record::{Comment, Corpus, Post};
use crate::zstd_jsonl::{for_each_line, parse_record};
use ahash::AHashSet;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Supplies posts (and optionally their comments) for a query.
/// May return fewer posts than `query.limit`, including none.
pub trait PostSource {
    fn fetch(&self, query: &FetchQuery) -> Result<Corpus>;
}

/// Reads `RS_YYYY-MM.zst` / `RC_YYYY-MM.zst` files in chronological order.
/// Posts are taken in file order until the limit is reached; comments are
/// kept when their link id names one of the fetched posts.
#[derive(Clone, Debug)]
pub struct DumpSource {
    pub submissions_dir: PathBuf,
    pub comments_dir: PathBuf,
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
    pub progress: bool,
    pub progress_label: Option<String>,
    pub read_buffer_bytes: usize,
}

impl DumpSource {
    pub fn from_options(opts: &AnalysisOptions) -> Self {
        Self {
            submissions_dir: opts.submissions_dir.clone(),
            comments_dir: opts.comments_dir.clone(),
            start: opts.start,
            end: opts.end,
            progress: opts.progress,
            progress_label: opts.progress_label.clone(),
            read_buffer_bytes: opts.read_buffer_bytes,
        }
    }

    fn scan_posts(&self, files: &[FileJob], q: &FetchQuery, pb: Option<&ProgressBar>) -> Result<Vec<Post>> {
        let bounds = bounds_tuple(self.start, self.end);
        let mut seen = AHashSet::new();
        let mut posts = Vec::new();
        for job in files {
            if posts.len() >= q.limit {
                break;
            }
            let mut rejected = 0usize;
            let flow = for_each_line(&job.path, self.read_buffer_bytes, |d| inc(pb, d), |line| {
                let Ok(rec) = parse_record(line) else {
                    rejected += 1;
                    return Ok(ControlFlow::Continue(()));
                };
                if !matches_submission(&rec, q) || !within_bounds(&rec, bounds) {
                    return Ok(ControlFlow::Continue(()));
                }
                if let Some(post) = rec.into_post() {
                    if seen.insert(post.id.clone()) {
                        posts.push(post);
                    }
                }
                if posts.len() >= q.limit { Ok(ControlFlow::Break(())) } else { Ok(ControlFlow::Continue(())) }
            })
            .with_context(|| format!("scanning {}", job.path.display()))?;
            warn_rejected(&job.path, rejected);
            if flow.is_break() {
                break;
            }
        }
        Ok(posts)
    }

    fn scan_comments(&self, files: &[FileJob], post_ids: &AHashSet<&str>, pb: Option<&ProgressBar>) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        for job in files {
            let mut rejected = 0usize;
            for_each_line(&job.path, self.read_buffer_bytes, |d| inc(pb, d), |line| {
                let Ok(rec) = parse_record(line) else {
                    rejected += 1;
                    return Ok(ControlFlow::Continue(()));
                };
                if !rec.is_comment() {
                    return Ok(ControlFlow::Continue(()));
                }
                if let Some(c) = rec.into_comment() {
                    if post_ids.contains(c.post_id.as_str()) {
                        comments.push(c);
                    }
                }
                Ok(ControlFlow::Continue(()))
            })
            .with_context(|| format!("scanning {}", job.path.display()))?;
            warn_rejected(&job.path, rejected);
        }
        Ok(comments)
    }
}

/// One warning per file for lines that did not parse as a record.
fn warn_rejected(path: &Path, rejected: usize) {
    if rejected > 0 {
        tracing::warn!(path = %path.display(), rejected, "skipped lines that are not valid records");
    }
}

#[inline]
fn inc(pb: Option<&ProgressBar>, delta: u64) {
    if let Some(pb) = pb {
        pb.inc(delta);
    }
}

impl PostSource for DumpSource {
    fn fetch(&self, q: &FetchQuery) -> Result<Corpus> {
        let rs = plan_files(&self.submissions_dir, FileKind::Submission, self.start, self.end);
        let rc = if q.include_comments {
            plan_files(&self.comments_dir, FileKind::Comment, self.start, self.end)
        } else {
            Vec::new()
        };
        if rs.is_empty() {
            tracing::warn!(dir = %self.submissions_dir.display(), "No submission files found matching selection. Check base_dir and date range.");
        } else {
            tracing::info!("Planned {} submission and {} comment files.", rs.len(), rc.len());
        }

        let pb = if self.progress {
            let total = total_compressed_size(&rs) + total_compressed_size(&rc);
            Some(make_progress_bar_labeled(total, self.progress_label.as_deref()))
        } else {
            None
        };

        let posts = self.scan_posts(&rs, q, pb.as_ref())?;
        let comments = if q.include_comments && !posts.is_empty() {
            let ids: AHashSet<&str> = posts.iter().map(|p| p.id.as_str()).collect();
            self.scan_comments(&rc, &ids, pb.as_ref())?
        } else {
            Vec::new()
        };

        if let Some(pb) = pb { pb.finish_with_message("fetch done"); }
        tracing::info!(subreddit = %q.subreddit, query = %q.search, posts = posts.len(), comments = comments.len(), "fetched");
        Ok(Corpus::new(posts, comments))
    }
}

/// Serves a fixed corpus with the same query semantics as [`DumpSource`].
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    pub corpus: Corpus,
}

impl MemorySource {
    pub fn new(posts: Vec<Post>, comments: Vec<Comment>) -> Self {
        Self { corpus: Corpus::new(posts, comments) }
    }
}

impl PostSource for MemorySource {
    fn fetch(&self, q: &FetchQuery) -> Result<Corpus> {
        let posts: Vec<Post> = self
            .corpus
            .posts
            .iter()
            .filter(|p| p.subreddit.eq_ignore_ascii_case(&q.subreddit))
            .filter(|p| {
                q.search.is_empty()
                    || p.title.to_lowercase().contains(&q.search)
                    || p.body.to_lowercase().contains(&q.search)
            })
            .take(q.limit)
            .cloned()
            .collect();
        let comments = if q.include_comments {
            let ids: AHashSet<&str> = posts.iter().map(|p| p.id.as_str()).collect();
            self.corpus.comments.iter().filter(|c| ids.contains(c.post_id.as_str())).cloned().collect()
        } else {
            Vec::new()
        };
        Ok(Corpus::new(posts, comments))
    }
}
