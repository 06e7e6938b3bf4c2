//! Paced streaming and batch output of hex dumps.
//!
//! [`RateLimitedRenderer`] formats its source one window at a time and
//! sleeps after each window until the window's share of the display rate
//! has elapsed, so a large dump scrolls by at a bounded speed regardless of
//! how fast formatting is. [`BatchWriter`] formats everything up front and
//! writes it to a file as fast as possible.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::format::{DumpFormatter, DumpOptions};
use crate::progress::{ProgressObserver, ProgressState};
use crate::{WINDOW_SIZE, WRITE_SLICE_SIZE};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Longest single sleep while pacing; the cancel token is checked in between
const PACING_SLICE: Duration = Duration::from_millis(50);

/// Summary of a finished streaming run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    /// Windows emitted
    pub windows: usize,
    /// Source bytes rendered
    pub source_bytes: u64,
    /// Formatted bytes written to the sink
    pub output_bytes: u64,
    /// Wall-clock time of the run, pacing included
    pub elapsed: Duration,
}

/// Streams a dump in fixed windows at a bounded byte rate
#[derive(Debug, Clone)]
pub struct RateLimitedRenderer {
    formatter: DumpFormatter,
    window_size: usize,
    display_rate: u64,
    cancel: CancelToken,
    sink: String,
}

impl RateLimitedRenderer {
    /// Create a renderer emitting at most `display_rate` source bytes per second
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if the options are out of range or
    /// `display_rate` is zero.
    pub fn new(options: DumpOptions, display_rate: u64) -> Result<Self> {
        if display_rate == 0 {
            return Err(Error::InvalidOption(
                "display rate must be at least 1 byte per second".into(),
            ));
        }
        let formatter = DumpFormatter::new(options)?;
        let window_size = align_window(WINDOW_SIZE, options.bytes_per_line);
        Ok(Self {
            formatter,
            window_size,
            display_rate,
            cancel: CancelToken::new(),
            sink: "output".into(),
        })
    }

    /// Override the window size
    ///
    /// The size is rounded down to a whole number of lines, and is never
    /// smaller than one line.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = align_window(window_size, self.formatter.options().bytes_per_line);
        self
    }

    /// Stop between windows (and while pacing) when `cancel` is tripped
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Name of the sink used in error messages
    #[must_use]
    pub fn with_sink_name(mut self, sink: impl Into<String>) -> Self {
        self.sink = sink.into();
        self
    }

    /// Effective window size in bytes
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Display rate in bytes per second
    #[must_use]
    pub fn display_rate(&self) -> u64 {
        self.display_rate
    }

    /// Minimum time a window of `len` bytes must occupy
    #[must_use]
    pub fn window_budget(&self, len: usize) -> Duration {
        Duration::from_secs_f64(len as f64 / self.display_rate as f64)
    }

    /// Stream an in-memory buffer to `out`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if writing fails, [`Error::Cancelled`] if
    /// the cancel token is tripped.
    pub fn stream_bytes<W: Write>(&self, data: &[u8], out: &mut W) -> Result<RenderReport> {
        let mut run = Run::new(self);
        let windows = data.len().div_ceil(self.window_size);

        for (i, window) in data.chunks(self.window_size).enumerate() {
            run.emit(window, i + 1 == windows, out)?;
        }
        Ok(run.finish())
    }

    /// Stream everything `reader` yields to `out`
    ///
    /// Reads one window ahead so the final window is known when it is
    /// formatted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if reading fails, [`Error::Output`] if
    /// writing fails, [`Error::Cancelled`] if the cancel token is tripped.
    pub fn stream_reader<R: Read, W: Write>(
        &self,
        mut reader: R,
        out: &mut W,
    ) -> Result<RenderReport> {
        let mut run = Run::new(self);
        let read_err = |source| Error::SourceRead { source };

        let mut current = vec![0u8; self.window_size];
        let mut next = vec![0u8; self.window_size];
        let mut current_len = fill_window(&mut reader, &mut current).map_err(read_err)?;

        while current_len > 0 {
            let next_len = fill_window(&mut reader, &mut next).map_err(read_err)?;
            run.emit(&current[..current_len], next_len == 0, out)?;
            std::mem::swap(&mut current, &mut next);
            current_len = next_len;
        }
        Ok(run.finish())
    }

    /// Stream the file at `path` to `out`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened, otherwise the
    /// errors of [`RateLimitedRenderer::stream_reader`].
    pub fn stream_file<P: AsRef<Path>, W: Write>(
        &self,
        path: P,
        out: &mut W,
    ) -> Result<RenderReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.stream_reader(file, out)
    }

    /// Sleep until the window started at `started` has used its budget
    ///
    /// The budget is [`Self::window_budget`] of the window's actual length,
    /// so a short final window waits proportionally less than a full one.
    fn pace(&self, started: Instant, len: usize) -> Result<()> {
        let budget = self.window_budget(len);
        let spent = started.elapsed();
        if spent >= budget {
            trace!("Window took {:?}, over budget {:?}", spent, budget);
            return Ok(());
        }

        let deadline = started + budget;
        trace!("Pacing for {:?}", budget - spent);
        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep((deadline - now).min(PACING_SLICE));
        }
    }
}

/// State of one streaming run
struct Run<'a> {
    renderer: &'a RateLimitedRenderer,
    text: String,
    report: RenderReport,
    started: Instant,
}

impl<'a> Run<'a> {
    fn new(renderer: &'a RateLimitedRenderer) -> Self {
        Self {
            renderer,
            text: String::with_capacity(renderer.formatter.estimate_len(renderer.window_size)),
            report: RenderReport {
                windows: 0,
                source_bytes: 0,
                output_bytes: 0,
                elapsed: Duration::ZERO,
            },
            started: Instant::now(),
        }
    }

    fn emit<W: Write>(&mut self, window: &[u8], is_final: bool, out: &mut W) -> Result<()> {
        let renderer = self.renderer;
        if renderer.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let window_started = Instant::now();
        self.text.clear();
        renderer.formatter.format_into(window, &mut self.text, is_final);

        let write_err = |source| Error::output(renderer.sink.clone(), source);
        out.write_all(self.text.as_bytes()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        self.report.windows += 1;
        self.report.source_bytes += window.len() as u64;
        self.report.output_bytes += self.text.len() as u64;
        debug!(
            "Window {} emitted ({} bytes, {} formatted)",
            self.report.windows,
            window.len(),
            self.text.len()
        );

        renderer.pace(window_started, window.len())
    }

    fn finish(mut self) -> RenderReport {
        self.report.elapsed = self.started.elapsed();
        self.report
    }
}

/// Round `size` down to whole lines, keeping at least one line
fn align_window(size: usize, bytes_per_line: usize) -> usize {
    (size - size % bytes_per_line).max(bytes_per_line)
}

/// Read until `buf` is full or the reader is exhausted
fn fill_window<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Writes a plain dump to a file without pacing
///
/// The output never carries colors or the gloss; the whole dump is
/// formatted first and then written in fixed-size slices, with progress
/// reported after every slice.
#[derive(Clone)]
pub struct BatchWriter {
    formatter: DumpFormatter,
    slice_size: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl BatchWriter {
    /// Create a writer producing `bytes_per_line` tokens per line
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `bytes_per_line` is out of range.
    pub fn new(bytes_per_line: usize) -> Result<Self> {
        Ok(Self {
            formatter: DumpFormatter::new(DumpOptions::new(bytes_per_line))?,
            slice_size: WRITE_SLICE_SIZE,
            observer: None,
        })
    }

    /// Report written bytes to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Override the slice size (at least one byte)
    #[must_use]
    pub fn with_slice_size(mut self, slice_size: usize) -> Self {
        self.slice_size = slice_size.max(1);
        self
    }

    /// Format `data` and write it to a new file at `path`
    ///
    /// Returns the number of bytes written, equal to the formatted length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if the file cannot be created or written.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, data: &[u8]) -> Result<u64> {
        let path = path.as_ref();
        let target = path.display().to_string();
        let file = File::create(path).map_err(|source| Error::output(target.clone(), source))?;

        let mut out = BufWriter::new(file);
        let written = self.write_to(data, &mut out, &target)?;
        out.flush().map_err(|source| Error::output(target.clone(), source))?;

        info!("Wrote {} bytes of dump to {}", written, target);
        Ok(written)
    }

    /// Format `data` and write it to `out`, slice by slice
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] naming `target` if a write fails.
    pub fn write_to<W: Write>(&self, data: &[u8], out: &mut W, target: &str) -> Result<u64> {
        let text = self.formatter.format(data);
        let progress = match &self.observer {
            Some(observer) => ProgressState::with_observer(text.len() as u64, observer.clone()),
            None => ProgressState::new(text.len() as u64),
        };

        for slice in text.as_bytes().chunks(self.slice_size) {
            out.write_all(slice)
                .map_err(|source| Error::output(target, source))?;
            progress.advance(slice.len() as u64);
        }

        debug_assert_eq!(progress.done(), text.len() as u64);
        Ok(progress.done())
    }
}

impl std::fmt::Debug for BatchWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchWriter")
            .field("formatter", &self.formatter)
            .field("slice_size", &self.slice_size)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
