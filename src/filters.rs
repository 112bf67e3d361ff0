//! Record-level predicates used while scanning the dump corpus.

use crate::date::YearMonth;
use crate::query::FetchQuery;
use crate::record::RawRecord;

pub fn matches_subreddit(rec: &RawRecord, sub: &str) -> bool {
    if let Some(s) = &rec.subreddit { s.eq_ignore_ascii_case(sub) } else { false }
}

/// Case-insensitive substring search over title and selftext, like the
/// platform's plain-term search. An empty search term accepts every post.
pub fn matches_search(rec: &RawRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let mut hay = String::new();
    if let Some(title) = rec.title.as_deref() { hay.push_str(&title.to_lowercase()); hay.push(' '); }
    if let Some(selftext) = rec.selftext.as_deref() { hay.push_str(&selftext.to_lowercase()); }
    hay.contains(search)
}

pub fn matches_submission(rec: &RawRecord, q: &FetchQuery) -> bool {
    !rec.is_comment() && rec.id.is_some() && matches_subreddit(rec, &q.subreddit) && matches_search(rec, &q.search)
}

/// Record-level YYYY-MM gate; records without a timestamp fail a bounded window.
pub fn within_bounds(rec: &RawRecord, bounds: Option<(YearMonth, YearMonth)>) -> bool {
    let Some((lo, hi)) = bounds else { return true };
    match rec.created_epoch() {
        Some(ts) => {
            let ym = YearMonth::from_epoch(ts);
            ym >= lo && ym <= hi
        }
        None => false,
    }
}

/// Record-level window for a month range; an open end is unbounded on that side.
pub fn bounds_tuple(start: Option<YearMonth>, end: Option<YearMonth>) -> Option<(YearMonth, YearMonth)> {
    if start.is_none() && end.is_none() {
        return None;
    }
    Some((
        start.unwrap_or(YearMonth { year: 0, month: 1 }),
        end.unwrap_or(YearMonth { year: u16::MAX, month: 12 }),
    ))
}
