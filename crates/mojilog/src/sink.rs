//! The shared output destination of renderers.

use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::LoggerError;

/// A byte writer shared by a renderer and every renderer derived from it.
///
/// Writes are serialized through a mutex: a renderer holds the lock while it formats and writes
/// one record, so concurrent records never interleave within a line.
#[derive(Clone)]
pub struct Sink(Arc<Mutex<Box<dyn Write + Send>>>);

impl Sink {
    /// Wraps a writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    /// A sink writing to the process standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// A sink writing to the process standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Locks the sink.
    ///
    /// A writer poisoned by a panicking thread is still usable: the panic can at most have left a
    /// partial line behind.
    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Formats one record into a buffer and writes it with a single `write_all` call, holding
    /// the lock throughout.
    pub(crate) fn write_record(
        &self,
        format: impl FnOnce(&mut Vec<u8>) -> Result<(), LoggerError>,
    ) -> Result<(), LoggerError> {
        let mut writer = self.lock();

        let mut buffer = Vec::with_capacity(256);
        format(&mut buffer)?;
        writer.write_all(&buffer)?;
        writer.flush()?;

        Ok(())
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}
