//! Flat CSV exports of fetched posts.

use crate::date::{day_of_week, hour_of_day, rfc3339};
use crate::normalize::{char_len, normalize_text};
use crate::record::Post;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

/// One post with the derived profiling columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    pub created_utc: i64,
    pub upvote_ratio: Option<f64>,
    pub selftext: String,
    pub link_flair_text: String,
    pub url: String,
    pub created_datetime: String,
    pub hour_of_day: u8,
    pub day_of_week: u8,
    pub title_length: usize,
    pub selftext_cleaned: String,
    pub selftext_length: usize,
    pub is_selfpost: bool,
}

impl PostRow {
    pub fn from_post(p: &Post, subreddit: &str) -> Self {
        let cleaned = normalize_text(&p.body);
        let url = p.url.clone().unwrap_or_default();
        let marker = format!("reddit.com/r/{}/comments/", subreddit.to_lowercase());
        let is_selfpost = p.is_self.unwrap_or(false) || url.to_lowercase().contains(&marker);
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            author: p.author_or_unknown().to_string(),
            score: p.score,
            num_comments: p.num_comments,
            created_utc: p.created_utc,
            upvote_ratio: p.upvote_ratio,
            selftext: p.body.clone(),
            link_flair_text: p.flair_or_none().to_string(),
            url,
            created_datetime: rfc3339(p.created_utc),
            hour_of_day: hour_of_day(p.created_utc),
            day_of_week: day_of_week(p.created_utc),
            title_length: char_len(&p.title),
            selftext_length: char_len(&cleaned),
            selftext_cleaned: cleaned,
            is_selfpost,
        }
    }
}

/// Reduced row of the post network export.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
}

impl From<&Post> for NetworkRow {
    fn from(p: &Post) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            author: p.author_or_unknown().to_string(),
            score: p.score,
            num_comments: p.num_comments,
        }
    }
}

/// Serialize `rows` with a header into `dest`, through a sibling temp file.
pub fn write_csv<T: Serialize>(rows: &[T], dest: &Path, write_buf: usize) -> Result<usize> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let tmp = dest.with_extension("csv.tmp");
    {
        let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = csv::Writer::from_writer(BufWriter::with_capacity(write_buf, file));
        for row in rows {
            w.serialize(row)?;
        }
        w.flush()?;
    }
    replace_file_atomic_backoff(&tmp, dest)?;
    tracing::info!(rows = rows.len(), path = %dest.display(), "csv written");
    Ok(rows.len())
}
