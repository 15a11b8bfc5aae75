//! The process-wide logger.
//!
//! The global logger is created at most once, either explicitly through [`init_global`] /
//! [`init_global_with`] or lazily with the defaults on first use of [`get`], the free functions
//! or the logging macros. Later initialization attempts return the existing logger unchanged.

use std::sync::OnceLock;

use tracing::Level;

use crate::{
    build_logger, clock, Attr, CallSite, LogFormat, Logger, LoggerConfig, LoggerError, Sink,
};

/// A lazily initialized [`Logger`], constructed exactly once even under concurrent first use.
///
/// The global logger lives in a `static LoggerCell`; separate cells give isolated loggers with
/// the same lifecycle.
#[derive(Debug, Default)]
pub struct LoggerCell {
    logger: OnceLock<Logger>,
}

impl LoggerCell {
    /// Creates an uninitialized cell.
    pub const fn new() -> Self {
        Self {
            logger: OnceLock::new(),
        }
    }

    /// Returns the logger, if the cell has been initialized.
    pub fn get(&self) -> Option<&Logger> {
        self.logger.get()
    }

    /// Initializes the cell from `config`, writing to `sink`, unless it is already initialized.
    /// Returns the logger held by the cell either way.
    ///
    /// With the `layer` feature and [`LoggerConfig::install_tracing`] set, the logger is also
    /// installed as the global `tracing` subscriber, if no other subscriber has been installed.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidFilteringDirective`] if the filtering directive in `config`
    /// cannot be parsed. The cell is left untouched in that case.
    pub fn init(&self, config: &LoggerConfig, sink: Sink) -> Result<&Logger, LoggerError> {
        #[cfg(feature = "layer")]
        {
            if config.install_tracing {
                crate::layer::env_filter(config)?;
            }
        }

        Ok(self.init_unchecked(config, sink))
    }

    /// Returns the logger, initializing it with the defaults and standard output first if needed.
    pub fn get_or_init_default(&self) -> &Logger {
        if let Some(logger) = self.get() {
            return logger;
        }
        self.init_unchecked(&LoggerConfig::default(), Sink::stdout())
    }

    fn init_unchecked(&self, config: &LoggerConfig, sink: Sink) -> &Logger {
        self.logger.get_or_init(|| {
            clock::init();
            let logger = build_logger(config, sink);
            #[cfg(feature = "layer")]
            {
                if config.install_tracing {
                    install_tracing(&logger, config);
                }
            }
            logger
        })
    }
}

#[cfg(feature = "layer")]
fn install_tracing(logger: &Logger, config: &LoggerConfig) {
    use tracing_subscriber::{layer::SubscriberExt, registry, util::SubscriberInitExt, Layer};

    let layer = crate::RendererLayer::new(logger.renderer().clone())
        .with_filter(crate::layer::env_filter_lossy(config));

    if registry().with(layer).try_init().is_err() {
        tracing::debug!("A global `tracing` subscriber is already installed, not replacing it");
    }
}

static GLOBAL: LoggerCell = LoggerCell::new();

/// Initializes the global logger on standard output.
///
/// Only the first initialization takes effect; later calls return the existing logger.
///
/// ```
/// use mojilog::{Attr, Level, LogFormat};
///
/// let logger = mojilog::init_global(Level::INFO, LogFormat::Text, true);
/// logger.info("Server started", vec![Attr::new("port", 8080)]);
/// ```
pub fn init_global(level: Level, format: LogFormat, add_source: bool) -> &'static Logger {
    let config = LoggerConfig::new(level, format, add_source);
    GLOBAL.init_unchecked(&config, Sink::stdout())
}

/// Initializes the global logger from `config`, writing to `sink`.
///
/// Only the first initialization takes effect; later calls return the existing logger.
///
/// # Errors
///
/// Returns [`LoggerError::InvalidFilteringDirective`] if the filtering directive in `config`
/// cannot be parsed.
pub fn init_global_with(
    config: &LoggerConfig,
    sink: Sink,
) -> Result<&'static Logger, LoggerError> {
    GLOBAL.init(config, sink)
}

/// Returns the global logger, initializing it with the defaults (compact JSON, `INFO`, no
/// call-sites) if nothing initialized it before.
pub fn get() -> &'static Logger {
    GLOBAL.get_or_init_default()
}

/// Returns a logger derived from the global logger that adds `attrs` to every record.
pub fn with(attrs: Vec<Attr>) -> Logger {
    get().with(attrs)
}

/// Returns a logger derived from the global logger that places attributes under `name`.
pub fn with_group(name: &str) -> Logger {
    get().with_group(name)
}

/// Logs through the global logger at `level`, attributing the record to the caller.
///
/// This function and the level functions below record the call-site as `file:line`, with no
/// function name. The [`log!`](crate::log!) and [`info!`](crate::info!) family of macros record
/// `file:function():line` instead.
#[track_caller]
pub fn log(level: Level, message: &str, attrs: Vec<Attr>) {
    let logger = get();
    if !logger.enabled(level) {
        return;
    }
    logger.emit(level, message, attrs, CallSite::caller());
}

/// Logs through the global logger at the `TRACE` level.
#[track_caller]
pub fn trace(message: &str, attrs: Vec<Attr>) {
    log(Level::TRACE, message, attrs);
}

/// Logs through the global logger at the `DEBUG` level.
#[track_caller]
pub fn debug(message: &str, attrs: Vec<Attr>) {
    log(Level::DEBUG, message, attrs);
}

/// Logs through the global logger at the `INFO` level.
#[track_caller]
pub fn info(message: &str, attrs: Vec<Attr>) {
    log(Level::INFO, message, attrs);
}

/// Logs through the global logger at the `WARN` level.
#[track_caller]
pub fn warn(message: &str, attrs: Vec<Attr>) {
    log(Level::WARN, message, attrs);
}

/// Logs through the global logger at the `ERROR` level.
#[track_caller]
pub fn error(message: &str, attrs: Vec<Attr>) {
    log(Level::ERROR, message, attrs);
}
