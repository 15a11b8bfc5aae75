//! The contract shared by all renderers, and [`AnyRenderer`], the renderer selected by a
//! [`LogFormat`](crate::LogFormat).

use serde_json::ser::{CompactFormatter, PrettyFormatter};
use tracing::Level;

use crate::{Attr, Decorated, JsonRenderer, LoggerError, Record, TextRenderer};

/// Turns records into bytes on a [`Sink`](crate::Sink).
///
/// Derivations (`with_attrs`, `with_group`) return new renderers that share the sink of their
/// parent but accumulate their own context; the parent is never modified.
pub trait Renderer: Send + Sync {
    /// Returns `true` if records at `level` would be rendered.
    fn enabled(&self, level: Level) -> bool;

    /// Formats and writes a single record.
    fn render(&self, record: Record) -> Result<(), LoggerError>;

    /// Returns a renderer that includes `attrs` in every record it renders.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Self
    where
        Self: Sized;

    /// Returns a renderer that places attributes added from now on under the group `name`.
    ///
    /// An empty name returns an unchanged copy.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;
}

/// Settings common to all renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererOptions {
    /// Minimum level of records to render.
    pub level: Level,

    /// Whether to include the call-site of each record.
    pub add_source: bool,

    /// Whether to emit ANSI color escapes.
    pub color: bool,
}

impl RendererOptions {
    /// Returns `true` if records at `level` pass the threshold.
    pub(crate) fn enabled(self, level: Level) -> bool {
        // `tracing` orders levels by verbosity, `TRACE` being the greatest.
        level <= self.level
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            add_source: false,
            color: true,
        }
    }
}

/// One of the built-in renderer configurations.
#[derive(Clone, Debug)]
pub enum AnyRenderer {
    /// Compact JSON, decorated through the message.
    Json(Decorated<JsonRenderer<CompactFormatter>>),

    /// Indented JSON carrying a separate `emoji` field.
    PrettyJson(JsonRenderer<PrettyFormatter<'static>>),

    /// Decorated single-line text.
    Text(TextRenderer),
}

impl Renderer for AnyRenderer {
    fn enabled(&self, level: Level) -> bool {
        match self {
            Self::Json(renderer) => renderer.enabled(level),
            Self::PrettyJson(renderer) => renderer.enabled(level),
            Self::Text(renderer) => renderer.enabled(level),
        }
    }

    fn render(&self, record: Record) -> Result<(), LoggerError> {
        match self {
            Self::Json(renderer) => renderer.render(record),
            Self::PrettyJson(renderer) => renderer.render(record),
            Self::Text(renderer) => renderer.render(record),
        }
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        match self {
            Self::Json(renderer) => Self::Json(renderer.with_attrs(attrs)),
            Self::PrettyJson(renderer) => Self::PrettyJson(renderer.with_attrs(attrs)),
            Self::Text(renderer) => Self::Text(renderer.with_attrs(attrs)),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        match self {
            Self::Json(renderer) => Self::Json(renderer.with_group(name)),
            Self::PrettyJson(renderer) => Self::PrettyJson(renderer.with_group(name)),
            Self::Text(renderer) => Self::Text(renderer.with_group(name)),
        }
    }
}
