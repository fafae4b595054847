//! Demo application behind the `rask-logkit` binary.

pub mod cli;
mod logging_system;

pub use cli::{Cli, ConsoleKind};
pub use logging_system::{DiagnosticsError, setup_diagnostics};

use crate::console::{ConsoleSink, StderrConsole, TracingConsole};
use crate::format::{Dbg, ErrorChain, Json};
use crate::lifecycle::{Window, WindowTracker};
use crate::{Logger, Severity, values};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_diagnostics(&cli.diagnostics).context("Failed to set up diagnostics")?;
    run(cli).await
}

/// Writes one record of each kind, then simulates the only window closing
/// so the background flush fires before the logger is released.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config().context("Invalid logging configuration")?;
    let delay = config.settings().background_flush_delay;
    let console: Arc<dyn ConsoleSink> = match cli.console_sink {
        ConsoleKind::Stderr => Arc::new(StderrConsole),
        ConsoleKind::Tracing => Arc::new(TracingConsole),
    };

    let logger = Logger::new(config, console);
    if logger.config().settings().file_switch {
        logger.start().context("Failed to start the file pipeline")?;
    }
    info!("Logging to {}", logger.current_log_file_path().display());

    let tracker = WindowTracker::new();
    tracker.add_observer(logger.lifecycle());
    let main_window: Arc<dyn Window> = Arc::new(DemoWindow::new("main"));
    tracker.register(Arc::clone(&main_window));

    write_samples(&logger);

    tracker.finish(&main_window);
    tokio::time::sleep(delay + Duration::from_millis(100)).await;

    logger.release().await;
    let metrics = logger.metrics();
    info!(
        enqueued = metrics.enqueued,
        dropped = metrics.dropped,
        flushes = metrics.flushes,
        bytes = metrics.flushed_bytes,
        "Logger released"
    );
    for path in logger.log_files() {
        info!("Log file: {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Session {
    user: &'static str,
    roles: Vec<&'static str>,
    expires_in_secs: u64,
}

fn write_samples(logger: &Logger) {
    logger.i(values!["logger ready"]);
    logger.d_tag("demo", values!["several", 3, "values", vec![1, 2, 3]]);
    logger.w_tag("demo", values![Some(2.5), None::<u8>]);
    logger.json(
        Severity::Info,
        "session",
        &Json(Session {
            user: "ana",
            roles: vec!["admin", "ops"],
            expires_in_secs: 3600,
        }),
    );
    logger.json(Severity::Debug, "session", &r#"{"token":"abc","scopes":["read"]}"#);
    logger.xml(Severity::Info, "manifest", "<app><feature name=\"sync\" enabled=\"true\"/></app>");
    logger.file(Severity::Info, "demo", &Dbg((1, "file only")));

    let err = std::io::Error::other("disk quota exceeded");
    logger.e_tag("storage", values![ErrorChain::from(&err)]);
}

struct DemoWindow {
    kind: String,
    finished: AtomicBool,
}

impl DemoWindow {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            finished: AtomicBool::new(false),
        }
    }
}

impl Window for DemoWindow {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn is_finishing(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}
