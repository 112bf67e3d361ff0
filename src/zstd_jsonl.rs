use crate::record::RawRecord;
use crate::util::open_with_backoff;
use anyhow::Result;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

#[inline]
fn warn_decode_skip(path: &Path, e: &anyhow::Error) {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::warn!(
        path = %abs.display(),
        error = %e,
        "skipping zstd file after decode error; records read before the error are kept"
    );
}

/// Parse one dump line. Extra fields are ignored.
#[inline]
pub fn parse_record(line: &str) -> Result<RawRecord> {
    Ok(serde_json::from_str(line)?)
}

/// A `Read` wrapper that counts compressed bytes read.
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}
impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Stream a zstd JSONL file line by line. `on_line` may stop the scan early
/// with `ControlFlow::Break`. `on_progress` receives compressed-byte deltas.
///
/// `window_log_max(31)` is requested up front so large-window frames decode.
/// A decode failure (corruption, truncation) logs one warning and the file is
/// treated as ended; the run continues.
pub fn for_each_line(
    path: &Path,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(&str) -> Result<ControlFlow<()>>,
) -> Result<ControlFlow<()>> {
    match for_each_line_attempt(path, read_buf_bytes, &mut on_progress, &mut on_line) {
        Ok(flow) => Ok(flow),
        Err(e) if e.downcast_ref::<io::Error>().is_some() => {
            warn_decode_skip(path, &e);
            if let Ok(meta) = fs::metadata(path) {
                on_progress(meta.len());
            }
            Ok(ControlFlow::Continue(()))
        }
        Err(e) => Err(e),
    }
}

fn for_each_line_attempt(
    path: &Path,
    read_buf_bytes: usize,
    on_progress: &mut impl FnMut(u64),
    on_line: &mut impl FnMut(&str) -> Result<ControlFlow<()>>,
) -> Result<ControlFlow<()>> {
    let file = open_with_backoff(path, 16, 50)?;
    let counter = Arc::new(AtomicU64::new(0));
    let cnt = CountingReader { inner: file, counter: counter.clone() };

    let mut decoder = Decoder::new(cnt)?;
    decoder.window_log_max(31)?;
    let mut reader = BufReader::with_capacity(read_buf_bytes.max(8 * 1024), decoder);

    let mut buf = String::with_capacity(16 * 1024);
    let mut last = 0u64;
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        if n == 0 {
            return Ok(ControlFlow::Continue(()));
        }
        if buf.ends_with('\n') {
            let _ = buf.pop();
            if buf.ends_with('\r') { let _ = buf.pop(); }
        }
        if buf.trim().is_empty() {
            continue;
        }
        if on_line(&buf)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
}
