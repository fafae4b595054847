//! Console output path.
//!
//! Rendering happens synchronously on the calling thread. The rendered
//! text goes to a `ConsoleSink`; every write is mirrored to the configured
//! `ConsoleOutputListener`.

mod render;

pub(crate) use render::ConsolePrinter;
pub use render::MAX_LEN;

use crate::domain::Severity;
use std::io::Write;

/// Destination of console writes.
pub trait ConsoleSink: Send + Sync {
    fn write(&self, severity: Severity, tag: &str, message: &str);
}

/// Writes `L/tag: line` to standard error, one line per message line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrConsole;

impl ConsoleSink for StderrConsole {
    fn write(&self, severity: Severity, tag: &str, message: &str) {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        for line in message.split('\n') {
            // A closed stderr is not worth reporting anywhere.
            let _ = writeln!(out, "{}/{}: {}", severity.letter(), tag, line);
        }
    }
}

/// Forwards console writes as `tracing` events under the
/// `rask_logkit::console` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn write(&self, severity: Severity, tag: &str, message: &str) {
        match severity {
            Severity::Verbose => {
                tracing::trace!(target: "rask_logkit::console", tag = %tag, "{}", message);
            }
            Severity::Debug => {
                tracing::debug!(target: "rask_logkit::console", tag = %tag, "{}", message);
            }
            Severity::Info => {
                tracing::info!(target: "rask_logkit::console", tag = %tag, "{}", message);
            }
            Severity::Warn => {
                tracing::warn!(target: "rask_logkit::console", tag = %tag, "{}", message);
            }
            Severity::Error | Severity::Assert => {
                tracing::error!(target: "rask_logkit::console", tag = %tag, "{}", message);
            }
        }
    }
}
