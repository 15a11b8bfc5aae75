//! The [`Logger`] handle.

use tracing::Level;

use crate::{AnyRenderer, Attr, CallSite, LoggerError, Record, Renderer};

/// A handle bound to a renderer, with one method per level.
///
/// The level methods check the threshold before doing anything else, capture the call-site of
/// their caller and discard render errors. Use [`Logger::handle`] to observe errors.
///
/// A call-site captured by these methods resolves to `file:line` only. The [`info!`] family
/// of macros, which log through the global logger, also records the calling function.
///
/// [`info!`]: crate::info!
#[derive(Clone, Debug)]
pub struct Logger<R = AnyRenderer> {
    renderer: R,
}

impl<R: Renderer> Logger<R> {
    /// Creates a logger rendering through `renderer`.
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// The bound renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns `true` if records at `level` would be rendered.
    pub fn enabled(&self, level: Level) -> bool {
        self.renderer.enabled(level)
    }

    /// Returns a logger that adds `attrs` to every record.
    #[must_use]
    pub fn with(&self, attrs: Vec<Attr>) -> Self {
        Self::new(self.renderer.with_attrs(attrs))
    }

    /// Returns a logger that places attributes under the group `name`.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        Self::new(self.renderer.with_group(name))
    }

    /// Renders `record` if its level is enabled.
    pub fn handle(&self, record: Record) -> Result<(), LoggerError> {
        if !self.enabled(record.level()) {
            return Ok(());
        }
        self.renderer.render(record)
    }

    /// Logs `message` at `level`, attributing it to the caller.
    ///
    /// The call-site carries the caller's file and line without a function name.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, attrs: Vec<Attr>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, message, attrs, CallSite::caller());
    }

    /// Logs at the `TRACE` level.
    #[track_caller]
    pub fn trace(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::TRACE, message, attrs);
    }

    /// Logs at the `DEBUG` level.
    #[track_caller]
    pub fn debug(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::DEBUG, message, attrs);
    }

    /// Logs at the `INFO` level.
    #[track_caller]
    pub fn info(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::INFO, message, attrs);
    }

    /// Logs at the `WARN` level.
    #[track_caller]
    pub fn warn(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::WARN, message, attrs);
    }

    /// Logs at the `ERROR` level.
    #[track_caller]
    pub fn error(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::ERROR, message, attrs);
    }

    /// Builds the record and renders it, without checking the threshold.
    pub(crate) fn emit(&self, level: Level, message: &str, attrs: Vec<Attr>, call_site: CallSite) {
        let mut record = Record::now(level, message).with_call_site(call_site);
        record.add_attrs(attrs);
        let _ = self.renderer.render(record);
    }
}
