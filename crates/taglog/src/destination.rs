//! crates/taglog/src/destination.rs
//! Where formatted messages end up.
//!
//! A destination is the external collaborator at the end of an
//! [`Output`](crate::Output): it accepts one formatted string per delivered
//! message. Any `FnMut(&str) -> io::Result<()>` closure qualifies;
//! [`WriterDestination`] adapts an [`io::Write`] implementor and
//! [`MemoryDestination`] collects entries in memory.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::line_mode::LineMode;

/// Receives formatted messages.
pub trait Destination: Send {
    /// Accepts a single formatted message.
    fn write_entry(&mut self, formatted: &str) -> io::Result<()>;
}

impl<F> Destination for F
where
    F: FnMut(&str) -> io::Result<()> + Send,
{
    fn write_entry(&mut self, formatted: &str) -> io::Result<()> {
        self(formatted)
    }
}

/// Streams formatted messages into an [`io::Write`] target.
///
/// Each entry is written with a single `write_all` followed by a flush so
/// file-backed destinations see complete lines even if the process exits
/// abruptly. The [`LineMode`] decides whether a newline is appended to
/// entries that do not already end with one.
///
/// # Examples
///
/// ```
/// use taglog::{Destination, LineMode, WriterDestination};
///
/// let mut destination = WriterDestination::new(Vec::new());
/// destination.write_entry("first")?;
/// destination.write_entry("second\n")?;
/// assert_eq!(destination.get_ref(), b"first\nsecond\n");
///
/// let mut raw = WriterDestination::with_line_mode(Vec::new(), LineMode::WithoutNewline);
/// raw.write_entry("ready")?;
/// assert_eq!(raw.into_inner(), b"ready".to_vec());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct WriterDestination<W> {
    writer: W,
    line_mode: LineMode,
}

impl<W> WriterDestination<W> {
    /// Creates a destination that terminates entries with a newline.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_line_mode(writer, LineMode::WithNewline)
    }

    /// Creates a destination with the provided [`LineMode`].
    #[must_use]
    pub const fn with_line_mode(writer: W, line_mode: LineMode) -> Self {
        Self { writer, line_mode }
    }

    /// Returns the current [`LineMode`].
    #[must_use]
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    /// Borrows the underlying writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the destination and returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Destination for WriterDestination<W>
where
    W: Write + Send,
{
    fn write_entry(&mut self, formatted: &str) -> io::Result<()> {
        self.writer.write_all(formatted.as_bytes())?;
        self.writer.write_all(self.line_mode.terminator(formatted))?;
        self.writer.flush()
    }
}

/// Shared in-memory destination.
///
/// Clones share the same buffer, so a handle kept by the caller observes
/// everything delivered through the clone handed to an output.
///
/// # Examples
///
/// ```
/// use taglog::{Logger, MemoryDestination, Output};
///
/// let memory = MemoryDestination::new();
/// let logger = Logger::new();
/// logger.add_output(Output::builder(memory.clone()).template("{tags}: {args[0]}")?.build());
///
/// logger.tags(["net"]).emit("connected".into());
/// assert_eq!(memory.entries(), ["net: connected"]);
/// # Ok::<(), taglog::TemplateError>(())
/// ```
#[derive(Clone, Default)]
pub struct MemoryDestination {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryDestination {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every entry received so far.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of entries received so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns every entry received so far.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Destination for MemoryDestination {
    fn write_entry(&mut self, formatted: &str) -> io::Result<()> {
        self.lock().push(formatted.to_owned());
        Ok(())
    }
}

impl fmt::Debug for MemoryDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDestination")
            .field("entries", &self.len())
            .finish()
    }
}
