use crate::date::{iter_year_months, YearMonth};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Type of monthly dump file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Comment,    // RC_YYYY-MM.zst
    Submission, // RS_YYYY-MM.zst
}

impl FileKind {
    fn pattern(self) -> &'static str {
        match self {
            FileKind::Comment => r"^RC_(\d{4})-(\d{2})\.zst$",
            FileKind::Submission => r"^RS_(\d{4})-(\d{2})\.zst$",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileJob {
    pub kind: FileKind,
    pub ym: YearMonth,
    pub path: PathBuf,
}

/// Month -> file for one directory. A missing directory yields an empty map.
pub fn discover_months(dir: &Path, kind: FileKind) -> BTreeMap<YearMonth, PathBuf> {
    let re = Regex::new(kind.pattern()).unwrap();
    let mut map = BTreeMap::new();
    if !dir.exists() {
        return map;
    }
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        let Some(name) = ent.file_name().to_str() else { continue };
        let Some(caps) = re.captures(name) else { continue };
        let (Ok(year), Ok(month)) = (caps[1].parse::<u16>(), caps[2].parse::<u8>()) else { continue };
        if (1..=12).contains(&month) {
            map.insert(YearMonth { year, month }, ent.path().to_path_buf());
        }
    }
    map
}

/// Chronological jobs for `kind` within `[start, end]`, clamped to what exists on disk.
pub fn plan_files(dir: &Path, kind: FileKind, start: Option<YearMonth>, end: Option<YearMonth>) -> Vec<FileJob> {
    let map = discover_months(dir, kind);
    let (Some(&first), Some(&last)) = (map.keys().next(), map.keys().next_back()) else {
        return Vec::new();
    };
    let lo = start.unwrap_or(first);
    let hi = end.unwrap_or(last);
    iter_year_months(lo, hi)
        .filter_map(|ym| map.get(&ym).map(|p| FileJob { kind, ym, path: p.clone() }))
        .collect()
}
