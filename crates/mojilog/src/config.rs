//! Logger configuration.

use std::{env, fmt, str::FromStr};

use tracing::Level;

use crate::{
    AnyRenderer, Decorated, JsonRenderer, Logger, LoggerError, RendererOptions, Sink, TextRenderer,
};

const ENV_LEVEL: &str = "MOJILOG_LEVEL";
const ENV_FORMAT: &str = "MOJILOG_FORMAT";
const ENV_SOURCE: &str = "MOJILOG_SOURCE";
const ENV_NO_COLOR: &str = "NO_COLOR";

/// Defines the output format of a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact, single-line JSON with the decoration prepended to the message.
    #[default]
    Json,

    /// Pretty-printed, multi-line JSON colored by level, with a separate `emoji` field.
    PrettyJson,

    /// Colored, human-readable single-line text.
    Text,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty-json" => Ok(Self::PrettyJson),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(LoggerError::Configuration(format!(
                "Unknown log format `{s}`, expected one of `json`, `pretty-json`, `text`"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
            Self::Text => "text",
        };
        write!(f, "{repr}")
    }
}

/// Comprehensive configuration for a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Minimum level of records to render.
    pub level: Level,

    /// Output format.
    pub format: LogFormat,

    /// If `true`, each record carries the file, function and line it was logged from.
    pub add_source: bool,

    /// If `true`, output contains ANSI color escapes.
    /// Compact JSON is never colored.
    pub color: bool,

    /// If `true`, initializing the global logger also installs it as the global `tracing`
    /// subscriber, so that `tracing` events are rendered the same way.
    /// Has no effect without the `layer` feature.
    pub install_tracing: bool,

    /// An `EnvFilter` directive (e.g., `"info,my_crate=debug"`) applied to `tracing` events, on
    /// top of `level`.
    /// If `None`, only `level` is used.
    pub filtering_directive: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            add_source: false,
            color: true,
            install_tracing: true,
            filtering_directive: None,
        }
    }
}

impl LoggerConfig {
    /// Creates a configuration from the level, format and `add_source` flag, leaving the other
    /// settings at their defaults.
    pub fn new(level: Level, format: LogFormat, add_source: bool) -> Self {
        Self {
            level,
            format,
            add_source,
            ..Self::default()
        }
    }

    /// Builds the configuration from environment variables, falling back to the defaults for
    /// unset variables.
    ///
    /// - `MOJILOG_LEVEL`: `trace`, `debug`, `info`, `warn` or `error`
    /// - `MOJILOG_FORMAT`: `json`, `pretty-json` or `text`
    /// - `MOJILOG_SOURCE`: `1`, `true` or `yes` to include call-sites
    /// - `NO_COLOR`: disables colors when set to a non-empty value
    ///
    /// An unknown format is an error, an unknown level falls back to `INFO`.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggerError> {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LEVEL) {
            config.level = parse_level(&level);
        }

        if let Some(format) = lookup(ENV_FORMAT) {
            config.format = format.parse()?;
        }

        if let Some(source) = lookup(ENV_SOURCE) {
            config.add_source = matches!(
                source.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        if lookup(ENV_NO_COLOR).is_some_and(|value| !value.is_empty()) {
            config.color = false;
        }

        Ok(config)
    }

    /// The options shared by the renderers built from this configuration.
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            level: self.level,
            add_source: self.add_source,
            color: self.color,
        }
    }
}

/// Converts a level name to a [`Level`].
///
/// Unrecognized names map to [`Level::INFO`].
///
/// ```
/// use mojilog::{parse_level, Level};
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("verbose"), Level::INFO);
/// ```
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Builds the renderer selected by `config.format`, writing to `sink`.
pub fn build_renderer(config: &LoggerConfig, sink: Sink) -> AnyRenderer {
    let options = config.renderer_options();

    match config.format {
        LogFormat::Json => {
            let uncolored = RendererOptions {
                color: false,
                ..options
            };
            AnyRenderer::Json(Decorated::new(JsonRenderer::compact(sink, uncolored)))
        }
        LogFormat::PrettyJson => {
            AnyRenderer::PrettyJson(JsonRenderer::pretty(sink, options).with_emoji_field(true))
        }
        LogFormat::Text => AnyRenderer::Text(TextRenderer::new(sink, options)),
    }
}

/// Builds a [`Logger`] from `config`, writing to `sink`.
pub fn build_logger(config: &LoggerConfig, sink: Sink) -> Logger {
    Logger::new(build_renderer(config, sink))
}
