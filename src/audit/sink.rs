//! Audit sink trait and the tracing and JSON-lines implementations.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use super::{AuditOutcome, AuditRecord};
use crate::error::AuditSinkError;

/// Append-only destination for audit records.
///
/// The store calls [`write`](Self::write) exactly once per access attempt,
/// before the operation's result is returned. A sink error never changes that
/// result; the store reports it separately.
///
/// Implementations must be `Send + Sync` so a single store can serve
/// concurrent callers.
pub trait AuditSink: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError`] if the record could not be encoded or written.
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError>;
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        (**self).write(record)
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Box<S> {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        (**self).write(record)
    }
}

/// Fan-out to two sinks. Both are always attempted; the first error wins.
impl<A: AuditSink, B: AuditSink> AuditSink for (A, B) {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        let first = self.0.write(record);
        let second = self.1.write(record);
        first.and(second)
    }
}

/// Emits each record as a structured `tracing` event on target `secret_audit`.
///
/// Successful attempts are logged at `info`, failed ones at `warn`. The
/// `origin` field is present only when the record carries one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates a tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        match record.outcome() {
            AuditOutcome::Success => tracing::info!(
                target: "secret_audit",
                sequence = record.sequence(),
                timestamp = %record.timestamp(),
                actor = %record.actor(),
                secret_path = %record.secret_path(),
                action = %record.action(),
                outcome = %record.outcome(),
                origin = record.origin().map(tracing::field::display),
                "SECRET_ACCESS"
            ),
            AuditOutcome::Failure => tracing::warn!(
                target: "secret_audit",
                sequence = record.sequence(),
                timestamp = %record.timestamp(),
                actor = %record.actor(),
                secret_path = %record.secret_path(),
                action = %record.action(),
                outcome = %record.outcome(),
                origin = record.origin().map(tracing::field::display),
                "SECRET_ACCESS"
            ),
        }
        Ok(())
    }
}

/// Writes one JSON object per line to any writer, flushing after each record.
///
/// If a write fails part-way, the next record starts on a fresh line so the
/// torn fragment cannot merge with it.
///
/// # Example
///
/// ```
/// use access_guard::audit::JsonLinesAuditSink;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let sink = JsonLinesAuditSink::open(dir.path().join("secret_access.log"))?;
/// # let _ = sink;
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct JsonLinesAuditSink<W = File> {
    state: Mutex<LineState<W>>,
}

#[derive(Debug)]
struct LineState<W> {
    writer: W,
    torn: bool,
}

impl JsonLinesAuditSink<File> {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditSinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> JsonLinesAuditSink<W> {
    /// Wraps an existing writer.
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(LineState {
                writer,
                torn: false,
            }),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }
}

impl<W: Write + Send> AuditSink for JsonLinesAuditSink<W> {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        let mut line = record.to_json()?;
        line.push('\n');

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.torn {
            line.insert(0, '\n');
        }
        if let Err(err) = state.writer.write_all(line.as_bytes()) {
            state.torn = true;
            return Err(err.into());
        }
        state.torn = false;
        state.writer.flush()?;
        Ok(())
    }
}
