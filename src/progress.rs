//! Progress bars for the corpus scan (bytes) and the clustering sweeps (items).

use crate::paths::FileJob;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::time::Duration;

const BAR_CHARS: &str = "█▉▊▋▌▍▎▏  ";

pub fn make_progress_bar_labeled(total_bytes: u64, label: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(total_bytes);
    let style = ProgressStyle::with_template(
        "{spinner:.green} scanning {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, eta {eta})"
    )
    .unwrap()
    .progress_chars(BAR_CHARS);
    pb.set_style(style);
    if let Some(msg) = label {
        pb.set_message(msg.to_string());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Item counter for per-community and per-k loops.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})"
    )
    .unwrap()
    .progress_chars(BAR_CHARS);
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn total_compressed_size(files: &[FileJob]) -> u64 {
    files
        .iter()
        .map(|j| fs::metadata(&j.path).map(|m| m.len()).unwrap_or(0))
        .sum()
}
