//! Using the global logger before any initialization falls back to the defaults.

use mojilog::{AnyRenderer, Level, LogFormat, Renderer};

#[test]
fn lazy_default_then_ignored_initialization() {
    let logger = mojilog::get();

    assert!(matches!(logger.renderer(), AnyRenderer::Json(_)));
    assert!(logger.enabled(Level::INFO));
    assert!(!logger.enabled(Level::DEBUG));
    assert!(logger.renderer().enabled(Level::ERROR));

    let later = mojilog::init_global(Level::TRACE, LogFormat::Text, true);
    assert!(std::ptr::eq(logger, later));
    assert!(!later.enabled(Level::TRACE));
    assert!(matches!(later.renderer(), AnyRenderer::Json(_)));
}
