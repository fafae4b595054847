//! Pluggable behaviour attached to a `LogConfig`.

use crate::domain::Severity;
use std::io;
use std::path::Path;

/// Replaces the default append-to-file step of the file sink.
///
/// Receives both the header block of a freshly created file and every
/// flushed batch.
pub trait FileWriter: Send + Sync {
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Observes every console write after it reached the console sink.
pub trait ConsoleOutputListener: Send + Sync {
    fn on_console_output(&self, severity: Severity, tag: &str, content: &str);
}

impl<F> ConsoleOutputListener for F
where
    F: Fn(Severity, &str, &str) + Send + Sync,
{
    fn on_console_output(&self, severity: Severity, tag: &str, content: &str) {
        self(severity, tag, content);
    }
}

/// Observes every chunk of text appended to a log file.
pub trait FileOutputListener: Send + Sync {
    fn on_file_output(&self, path: &Path, content: &str);
}

impl<F> FileOutputListener for F
where
    F: Fn(&Path, &str) + Send + Sync,
{
    fn on_file_output(&self, path: &Path, content: &str) {
        self(path, content);
    }
}
