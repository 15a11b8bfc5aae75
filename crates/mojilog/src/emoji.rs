//! Emoji decoration derived from a record's level and message.
//!
//! Message content takes priority over the level: a message mentioning a shutdown gets the
//! shutdown symbol whatever its level. Only when no message rule matches does the level
//! mapping apply. Everything here is a pure function of its input.

use std::fmt;

use tracing::Level;
use unicode_width::UnicodeWidthStr;

struct Rule {
    /// Substring that must also be present for the rule to apply.
    requires: Option<&'static str>,
    /// The rule matches if any of these substrings is present.
    any_of: &'static [&'static str],
    symbol: &'static str,
}

impl Rule {
    const fn new(any_of: &'static [&'static str], symbol: &'static str) -> Self {
        Self {
            requires: None,
            any_of,
            symbol,
        }
    }

    const fn health(status: &'static [&'static str], symbol: &'static str) -> Self {
        Self {
            requires: Some("health"),
            any_of: status,
            symbol,
        }
    }

    fn matches(&self, lowercase: &str) -> bool {
        let found = |needle: &str| lowercase.contains(needle);
        self.requires.is_none_or(found) && self.any_of.iter().any(|needle| found(needle))
    }
}

// Evaluated top to bottom, first match wins.
const MESSAGE_RULES: &[Rule] = &[
    // Health status
    Rule::health(&["excellent"], "💚"),
    Rule::health(&["good"], "🟡"),
    Rule::health(&["degraded"], "🟠"),
    Rule::health(&["critical"], "🔴"),
    // Lifecycle
    Rule::new(&["shutdown", "stopping"], "🛑"),
    Rule::new(&["start", "parser is running"], "🚀"),
    Rule::new(&["success"], "🎉"),
    Rule::new(&["cleanup"], "🧹"),
    // Operations
    Rule::new(&["config", "setting"], "⚙️"),
    Rule::new(&["connect", "websocket"], "🔌"),
    Rule::new(&["failed"], "❌"),
    Rule::new(&["table", "game", "casino"], "🎰"),
    Rule::new(&["statistics", "metrics"], "📊"),
    Rule::new(&["loading", "processing"], "⏳"),
    Rule::new(&["creating"], "🆕"),
];

/// Returns the emoji associated with a level.
pub fn emoji_for_level(level: Level) -> &'static str {
    match level {
        Level::ERROR => "❌",
        Level::WARN => "⚠️",
        Level::INFO => "ℹ️",
        Level::DEBUG => "🔍",
        Level::TRACE => "📝",
    }
}

/// Returns the emoji for the first message rule matching `message`, if any.
///
/// Matching is ASCII case-insensitive.
///
/// ```
/// assert_eq!(mojilog::emoji_for_message("Graceful SHUTDOWN requested"), Some("🛑"));
/// assert_eq!(mojilog::emoji_for_message("nothing to see"), None);
/// ```
pub fn emoji_for_message(message: &str) -> Option<&'static str> {
    let message = message.to_ascii_lowercase();

    MESSAGE_RULES
        .iter()
        .find(|rule| rule.matches(&message))
        .map(|rule| rule.symbol)
}

/// Returns the padding to place after `symbol` so that text following narrow and wide symbols
/// lines up in a fixed-width terminal.
pub fn spacing_for(symbol: &str) -> &'static str {
    if symbol.width() > 1 {
        " "
    } else {
        "  "
    }
}

/// An emoji together with the padding that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoration {
    /// The emoji.
    pub symbol: &'static str,

    /// Padding inserted between the emoji and the message.
    pub spacing: &'static str,
}

impl Decoration {
    /// Resolves the decoration for a record, preferring message rules over the level mapping.
    pub fn resolve(level: Level, message: &str) -> Self {
        let symbol = emoji_for_message(message).unwrap_or_else(|| emoji_for_level(level));

        Self {
            symbol,
            spacing: spacing_for(symbol),
        }
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol, self.spacing)
    }
}
