/// Errors that can occur within the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Represents an error in configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Represents a failure of the output sink.
    #[error("Failed to write log record: {0}")]
    Write(#[from] std::io::Error),

    /// Represents a failure to format a text line.
    #[error("Failed to format log record")]
    Format(#[from] std::fmt::Error),

    /// Represents an error during JSON serialization.
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Represents an error due to an invalid filtering directive.
    #[cfg(feature = "layer")]
    #[error("Failed to parse filtering directive: {0}")]
    InvalidFilteringDirective(#[from] tracing_subscriber::filter::ParseError),
}
