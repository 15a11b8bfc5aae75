//! A renderer wrapper that puts the emoji decoration in front of the message.

use tracing::Level;

use crate::{Attr, Decoration, LoggerError, Record, Renderer};

/// Prepends the [`Decoration`] of each record to its message, then hands the record to the
/// wrapped renderer.
///
/// The wrapped renderer should not decorate on its own.
#[derive(Clone, Debug)]
pub struct Decorated<R> {
    inner: R,
}

impl<R: Renderer> Decorated<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// The wrapped renderer.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Renderer> Renderer for Decorated<R> {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn render(&self, mut record: Record) -> Result<(), LoggerError> {
        let decoration = Decoration::resolve(record.level(), record.message());
        record.prefix_message(decoration);
        self.inner.render(record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        Self::new(self.inner.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Self {
        Self::new(self.inner.with_group(name))
    }
}
