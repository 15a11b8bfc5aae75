//! `mojilog` renders structured log records as emoji-decorated, colored text or as JSON.
//!
//! It offers:
//! - A [`TextRenderer`] writing one colored line per record, and a [`JsonRenderer`] writing
//!   compact or indented JSON objects.
//! - A [`Decorated`] wrapper adding the emoji [`Decoration`] of a record to its message, in front
//!   of any [`Renderer`].
//! - A process-wide [`Logger`] initialized once through [`init_global`] or lazily through
//!   [`get`], with free functions and macros that capture the call-site of the caller.
//! - With the `layer` feature, a [`RendererLayer`] that renders `tracing` events through the
//!   same renderers.
//!
//! Decoration is derived from the message first: `"Server started"` gets 🚀 and a message
//! mentioning a shutdown gets 🛑, whatever its level. Messages matching no rule fall back to a
//! per-level emoji. Attributes such as `service` or `pid` are never rendered, see
//! [`should_skip`].
//!
//! # Example
//!
//! ```
//! use mojilog::{Attr, Level, LogFormat};
//!
//! mojilog::init_global(Level::DEBUG, LogFormat::Text, true);
//!
//! mojilog::info!("Application started successfully", "env" => "development");
//! mojilog::warn("Cache miss detected", vec![Attr::string("key", "user:123")]);
//!
//! let user_log = mojilog::with(vec![Attr::string("user_id", "user-123")]);
//! user_log.info("User logged in", vec![Attr::string("ip", "192.168.1.1")]);
//! ```

mod clock;
mod config;
mod decorate;
mod emoji;
mod error;
mod global;
mod json;
mod keys;
#[cfg(feature = "layer")]
mod layer;
mod logger;
mod macros;
mod record;
mod renderer;
mod sink;
mod text;

pub use tracing::Level;

pub use self::{
    config::{build_logger, build_renderer, parse_level, LogFormat, LoggerConfig},
    decorate::Decorated,
    emoji::{emoji_for_level, emoji_for_message, spacing_for, Decoration},
    error::LoggerError,
    global::{
        debug, error, get, info, init_global, init_global_with, log, trace, warn, with,
        with_group, LoggerCell,
    },
    json::JsonRenderer,
    keys::should_skip,
    logger::Logger,
    record::{Attr, CallSite, Record, Source, Value},
    renderer::{AnyRenderer, Renderer, RendererOptions},
    sink::Sink,
    text::TextRenderer,
};

#[cfg(feature = "layer")]
pub use self::layer::{env_filter, RendererLayer};

/// Support code for the logging macros. Not public API.
#[doc(hidden)]
pub mod __private {
    use crate::{Attr, CallSite, Level, Logger};

    /// Renders a record built by a macro, discarding render errors.
    pub fn emit(
        logger: &Logger,
        level: Level,
        message: &str,
        attrs: Vec<Attr>,
        call_site: CallSite,
    ) {
        logger.emit(level, message, attrs, call_site);
    }

    /// Strips the path segment of the marker function the macros declare.
    pub fn enclosing_function(marker_path: &'static str) -> &'static str {
        marker_path.strip_suffix("::__here").unwrap_or(marker_path)
    }
}
