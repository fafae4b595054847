use thiserror::Error;

/// Top-level error type for the logging facility.
///
/// Logging calls themselves never return this; it surfaces from setup
/// operations (`start`, config loading) and from explicit flushes.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Sink error: {0}")]
    Sink(#[from] crate::sink::SinkError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::buffer::QueueError),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}
