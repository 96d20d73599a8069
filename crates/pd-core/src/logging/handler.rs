//! Output handlers.
//!
//! A handler owns one formatter and one destination. Destinations are
//! `tracing_subscriber` [`MakeWriter`]s, so anything usable as a `fmt`
//! layer writer (stdout, stderr, files behind a mutex, test buffers) works
//! here too.

use super::formatter::RecordFormatter;
use super::record::LogRecord;
use super::LogError;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Receives records from a logger and writes them somewhere.
pub trait Handler: Send + Sync {
    /// Most verbose level this handler emits.
    fn level(&self) -> LevelFilter {
        LevelFilter::TRACE
    }

    /// Format and write one record.
    fn handle(&self, record: &LogRecord) -> Result<(), LogError>;
}

/// Writer factory for standard output.
pub type Stdout = fn() -> io::Stdout;

/// Writes one formatted line per record.
pub struct StreamHandler<W = Stdout> {
    writer: W,
    formatter: Box<dyn RecordFormatter>,
    level: LevelFilter,
}

impl<W> StreamHandler<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    pub fn new(writer: W, formatter: impl RecordFormatter + 'static) -> Self {
        Self {
            writer,
            formatter: Box::new(formatter),
            level: LevelFilter::TRACE,
        }
    }

    /// Only emit records at `level` or more severe.
    pub fn with_level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = level.into();
        self
    }
}

impl<W> std::fmt::Debug for StreamHandler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandler")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl<W> Handler for StreamHandler<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn handle(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut line = self.formatter.format(record)?;
        line.push('\n');

        // One write call per line keeps concurrent records from interleaving.
        let mut writer = self.writer.make_writer();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// In-memory destination, mostly for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Written lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MemoryWriter {
    type Writer = MemoryWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
