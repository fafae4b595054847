//! Domain layer for rask-logkit.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEntry`: A rendered record travelling from the call site to the file sink
//! - `Severity`: Record severity (Verbose/Debug/Info/Warn/Error/Assert)
//! - `LogKind`: How the record body is rendered and routed
//! - `LogError`: Top-level error type

pub mod error;
pub mod log_entry;
pub mod severity;

pub use error::LogError;
pub use log_entry::{LogEntry, LogKind};
pub use severity::Severity;
