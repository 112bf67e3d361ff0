//! JSON report sinks. A failed write never aborts an analysis.

use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A step that was skipped, and why.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub step: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(step: impl Into<String>, reason: impl ToString) -> Self {
        Self { step: step.into(), reason: reason.to_string() }
    }
}

/// Collected skip diagnostics; each is logged when recorded.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn record(&mut self, step: impl Into<String>, reason: impl ToString) {
        let d = Diagnostic::new(step, reason);
        tracing::warn!(step = %d.step, "skipped: {}", d.reason);
        self.0.push(d);
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
    pub fn contains_step(&self, step: &str) -> bool {
        self.0.iter().any(|d| d.step == step)
    }
}

pub fn write_json<T: Serialize>(value: &T, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let tmp = dest.with_extension("json.tmp");
    {
        let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, value)?;
        w.write_all(b"\n")?;
        w.flush()?;
    }
    replace_file_atomic_backoff(&tmp, dest)
}

/// Writes `<out_dir>/<name>.json` when an output directory is configured.
/// Errors are logged and swallowed.
pub fn emit<T: Serialize>(out_dir: Option<&Path>, name: &str, value: &T) -> Option<PathBuf> {
    let dir = out_dir?;
    let dest = dir.join(format!("{name}.json"));
    match write_json(value, &dest) {
        Ok(()) => {
            tracing::info!(path = %dest.display(), "report written");
            Some(dest)
        }
        Err(e) => {
            tracing::warn!(path = %dest.display(), "report not written: {e:#}");
            None
        }
    }
}
