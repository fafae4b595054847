// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond and byte counts stay far below the limits
    clippy::cast_possible_wrap,       // Spans are bounded by i64 epoch millis
    clippy::cast_sign_loss,           // rem_euclid results are non-negative
    clippy::missing_errors_doc,       // Error enums document themselves
    clippy::missing_panics_doc,       // Library code does not panic
    clippy::module_name_repetitions,  // e.g. SinkError in sink module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

//! Buffered, asynchronous application logging.
//!
//! A [`Logger`] renders every call on the calling thread, prints a bordered
//! block to a [`ConsoleSink`] and queues file-bound records for a background
//! pipeline that batches them into date-rotated files. Window lifecycle
//! events flush the pipeline when the application goes to the background.

pub mod app;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod console;
pub mod domain;
pub mod facility;
pub mod format;
pub mod lifecycle;
pub mod sink;
pub mod store;
pub mod timefmt;

pub use buffer::MetricsSnapshot;
pub use config::{LogConfig, LogSettings};
pub use console::{ConsoleSink, StderrConsole, TracingConsole};
pub use domain::{LogEntry, LogError, LogKind, Severity};
pub use facility::Logger;
pub use format::{Dbg, ErrorChain, Formattable, FormatterRegistry, Json};
pub use lifecycle::{AppState, LifecycleMonitor, LifecycleObserver, WindowTracker};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
