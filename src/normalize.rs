//! Canonical text form used by every downstream text step.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"http\S+").expect("static regex"))
}

// a-z, Latin-1 lowercase letters (à..ö, ø..ú; ÷ excluded) and whitespace.
fn outside_alphabet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zà-öø-ú\s]").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Lowercase, strip URLs, drop characters outside the alphabet, collapse whitespace.
///
/// The URL pass runs again after filtering, since dropping punctuation can
/// glue a fresh `http...` run together (`"ht-tp:x"` -> `"httpx"`).
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = url_re().replace_all(&lower, "");
    let filtered = outside_alphabet_re().replace_all(&no_urls, "");
    let filtered = url_re().replace_all(&filtered, "");
    whitespace_re().replace_all(&filtered, " ").trim().to_string()
}

/// Absent text normalizes to the empty string.
#[inline]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

/// Non-string JSON values (null, numbers, objects, ...) normalize to "".
#[inline]
pub fn normalize_value(v: &Value) -> String {
    normalize_opt(v.as_str())
}

/// Character length of the normalized form, the unit of every content threshold.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
