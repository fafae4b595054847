//! The logging facility.
//!
//! A `Logger` renders each call on the calling thread, writes the console
//! block synchronously and hands file-bound records to a background
//! pipeline. The pipeline is created on first use and rebuilt after
//! `release`, so a logger stays usable for its whole lifetime.

mod pipeline;
mod tag;

use crate::buffer::{LogQueue, MetricsSnapshot, QueueError, QueueMetrics};
use crate::config::LogConfig;
use crate::console::{ConsolePrinter, ConsoleSink, StderrConsole};
use crate::domain::{LogEntry, LogError, LogKind, Severity};
use crate::format::{Formattable, NOTHING, format_xml, render_body};
use crate::lifecycle::{FlushTarget, LifecycleMonitor};
use crate::sink::{FileSink, LogFileMatcher};
use chrono::Local;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use pipeline::{Pipeline, Retired};
use std::panic::Location;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// How a record enters the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Non-blocking; dropped when the queue is full.
    Offer,
    /// Never dropped; waits on a task when the queue is full.
    Wait,
}

struct LoggerInner {
    config: RwLock<Arc<LogConfig>>,
    console: Arc<dyn ConsoleSink>,
    pipeline: Mutex<Option<Pipeline>>,
    /// Stopped pipeline still writing; the next pipeline waits for it.
    retired: Mutex<Option<Retired>>,
    metrics: Arc<QueueMetrics>,
    runtime: Option<Handle>,
    warned_no_runtime: AtomicBool,
}

/// Buffered, asynchronous logger.
///
/// ```no_run
/// use rask_logkit::{LogConfig, Logger, values};
///
/// # async fn demo() {
/// let logger = Logger::stderr(LogConfig::default().with_file_switch(true));
/// logger.i_tag("net", values!["connected to", 8080]);
/// logger.release().await;
/// # }
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
    lifecycle: Arc<LifecycleMonitor>,
}

impl Logger {
    /// Creates a logger writing console output to `console`. The current
    /// tokio runtime, if any, is remembered for the file pipeline.
    pub fn new(config: LogConfig, console: Arc<dyn ConsoleSink>) -> Self {
        Self::build(config, console, Handle::try_current().ok())
    }

    pub fn with_runtime(config: LogConfig, console: Arc<dyn ConsoleSink>, runtime: Handle) -> Self {
        Self::build(config, console, Some(runtime))
    }

    /// Logger with a `StderrConsole`.
    pub fn stderr(config: LogConfig) -> Self {
        Self::new(config, Arc::new(StderrConsole))
    }

    fn build(config: LogConfig, console: Arc<dyn ConsoleSink>, runtime: Option<Handle>) -> Self {
        let delay = config.settings().background_flush_delay;
        let inner = Arc::new(LoggerInner {
            config: RwLock::new(Arc::new(config)),
            console,
            pipeline: Mutex::new(None),
            retired: Mutex::new(None),
            metrics: Arc::new(QueueMetrics::new()),
            runtime: runtime.clone(),
            warned_no_runtime: AtomicBool::new(false),
        });
        let target = Arc::downgrade(&inner) as Weak<dyn FlushTarget>;
        let lifecycle = Arc::new(LifecycleMonitor::new(target, delay, runtime));
        Self { inner, lifecycle }
    }

    pub fn config(&self) -> Arc<LogConfig> {
        Arc::clone(&self.inner.config.read())
    }

    /// Starts the file pipeline now instead of on the first file-bound call.
    pub fn start(&self) -> Result<(), LogError> {
        self.inner.ensure_pipeline().map(|_| ())
    }

    /// Stops the pipeline without waiting. Queued entries are still written
    /// in the background, ahead of anything logged afterwards.
    pub fn stop(&self) {
        self.lifecycle.cancel_pending();
        let pipeline = self.inner.pipeline.lock().take();
        if let Some(pipeline) = pipeline {
            *self.inner.retired.lock() = Some(pipeline.retire());
            debug!("Log pipeline stopped");
        }
    }

    /// Stops the pipeline and waits until every queued entry is on disk.
    /// The next file-bound call starts a fresh pipeline.
    pub async fn release(&self) {
        self.lifecycle.cancel_pending();
        let pipeline = self.inner.pipeline.lock().take();
        let retired = self.inner.retired.lock().take();
        if let Some(retired) = retired {
            retired.finished().await;
        }
        if let Some(pipeline) = pipeline {
            pipeline.shutdown().await;
            debug!("Log pipeline released");
        }
    }

    /// Replaces the configuration. A running pipeline is stopped so the next
    /// file-bound call picks up the new settings.
    pub fn reconfigure(&self, config: LogConfig) {
        self.lifecycle.set_delay(config.settings().background_flush_delay);
        *self.inner.config.write() = Arc::new(config);
        self.stop();
    }

    /// Observer to feed window lifecycle events into.
    pub fn lifecycle(&self) -> Arc<LifecycleMonitor> {
        Arc::clone(&self.lifecycle)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Requests a flush of the buffered text without waiting for it.
    pub fn flush(&self) {
        let running = self
            .inner
            .pipeline
            .lock()
            .as_ref()
            .map(|p| (Arc::clone(p.accumulator()), p.runtime().clone()));
        if let Some((accumulator, runtime)) = running {
            runtime.spawn(async move {
                let _ = accumulator.flush().await;
            });
        }
    }

    /// Flushes the buffered text and returns the file written to, if any.
    ///
    /// Entries still waiting in the queue are not included; use `release`
    /// for that.
    pub async fn flush_now(&self) -> Result<Option<PathBuf>, LogError> {
        let accumulator = self
            .inner
            .pipeline
            .lock()
            .as_ref()
            .map(|p| Arc::clone(p.accumulator()));
        match accumulator {
            Some(accumulator) => Ok(accumulator.flush().await?),
            None => Ok(None),
        }
    }

    pub fn current_log_file_path(&self) -> PathBuf {
        let config = self.config();
        let settings = config.settings();
        FileSink::path_in(
            &config.effective_dir(),
            &settings.file_prefix,
            &settings.file_extension,
            Local::now().date_naive(),
        )
    }

    /// Log files of this logger's prefix in its directory, sorted by name.
    pub fn log_files(&self) -> Vec<PathBuf> {
        let config = self.config();
        match LogFileMatcher::new(&config.settings().file_prefix) {
            Ok(matcher) => matcher.list(&config.effective_dir()),
            Err(e) => {
                error!("Cannot list log files: {}", e);
                Vec::new()
            }
        }
    }

    #[track_caller]
    pub fn v(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Verbose, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn d(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Debug, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn i(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Info, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn w(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Warn, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn e(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Error, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn a(&self, values: &[&dyn Formattable]) {
        self.dispatch_values(Severity::Assert, LogKind::Standard, None, values, Location::caller());
    }

    #[track_caller]
    pub fn v_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Verbose, tag, values);
    }

    #[track_caller]
    pub fn d_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Debug, tag, values);
    }

    #[track_caller]
    pub fn i_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Info, tag, values);
    }

    #[track_caller]
    pub fn w_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Warn, tag, values);
    }

    #[track_caller]
    pub fn e_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Error, tag, values);
    }

    #[track_caller]
    pub fn a_tag(&self, tag: &str, values: &[&dyn Formattable]) {
        self.log(Severity::Assert, tag, values);
    }

    /// A blank `tag` is replaced by the caller's file name.
    #[track_caller]
    pub fn log(&self, severity: Severity, tag: &str, values: &[&dyn Formattable]) {
        self.dispatch_values(severity, LogKind::Standard, Some(tag), values, Location::caller());
    }

    /// Writes to the log file only, even when the file switch is off.
    #[track_caller]
    pub fn file(&self, severity: Severity, tag: &str, value: &dyn Formattable) {
        self.dispatch_values(severity, LogKind::FileOnly, Some(tag), &[value], Location::caller());
    }

    /// Pretty-prints a JSON value or JSON text.
    #[track_caller]
    pub fn json(&self, severity: Severity, tag: &str, value: &dyn Formattable) {
        self.dispatch_values(severity, LogKind::Json, Some(tag), &[value], Location::caller());
    }

    /// Pretty-prints an XML document. Malformed input is logged as is.
    #[track_caller]
    pub fn xml(&self, severity: Severity, tag: &str, content: &str) {
        self.dispatch(severity, LogKind::Xml, Some(tag), Location::caller(), |_| {
            if content.is_empty() {
                NOTHING.to_string()
            } else {
                format_xml(content)
            }
        });
    }

    fn dispatch_values(
        &self,
        severity: Severity,
        kind: LogKind,
        tag: Option<&str>,
        values: &[&dyn Formattable],
        location: &'static Location<'static>,
    ) {
        self.dispatch(severity, kind, tag, location, |config| {
            render_body(kind, values, config.formatters())
        });
    }

    fn dispatch(
        &self,
        severity: Severity,
        kind: LogKind,
        tag: Option<&str>,
        location: &'static Location<'static>,
        render: impl FnOnce(&LogConfig) -> String,
    ) {
        let config = self.config();
        let settings = config.settings();
        if !settings.log_switch {
            return;
        }

        let file_only = kind == LogKind::FileOnly;
        if !settings.console_switch && !settings.file_switch && !file_only {
            return;
        }
        if severity < settings.console_filter && severity < settings.file_filter {
            return;
        }

        let to_console = settings.console_switch && !file_only && severity >= settings.console_filter;
        let to_file = (settings.file_switch || file_only) && severity >= settings.file_filter;
        if !to_console && !to_file {
            return;
        }

        let tag_head = tag::resolve(tag, settings, location);
        let body = render(&config);

        if to_console {
            let listener = config.console_listener().map(|l| &**l);
            ConsolePrinter::new(&*self.inner.console, listener, settings).print(
                severity,
                &tag_head.tag,
                tag_head.console_head.as_deref(),
                &body,
            );
        }

        if to_file {
            let entry = LogEntry::new(severity, tag_head.tag, format!("{}{}", tag_head.file_head, body));
            let delivery = if to_console {
                Delivery::Offer
            } else {
                Delivery::Wait
            };
            self.inner.submit(entry, delivery);
        }
    }
}

impl LoggerInner {
    fn submit(&self, entry: LogEntry, delivery: Delivery) {
        let (queue, runtime) = match self.ensure_pipeline() {
            Ok(running) => running,
            Err(LogError::NoRuntime(reason)) => {
                if !self.warned_no_runtime.swap(true, Ordering::Relaxed) {
                    warn!("File logging disabled: {}", reason);
                }
                return;
            }
            Err(e) => {
                error!("File logging unavailable: {}", e);
                return;
            }
        };

        let result = match delivery {
            Delivery::Offer => queue.offer(entry),
            Delivery::Wait => queue.enqueue_or_wait(entry, &runtime),
        };
        match result {
            Ok(()) | Err(QueueError::Full) => {}
            Err(QueueError::Closed) => debug!("Log entry discarded, pipeline is shutting down"),
        }
    }

    fn ensure_pipeline(&self) -> Result<(LogQueue, Handle), LogError> {
        let mut slot = self.pipeline.lock();
        if let Some(pipeline) = slot.as_ref()
            && pipeline.is_running()
        {
            return Ok((pipeline.queue().clone(), pipeline.runtime().clone()));
        }

        let runtime = Handle::try_current()
            .ok()
            .or_else(|| self.runtime.clone())
            .ok_or_else(|| LogError::NoRuntime("no tokio runtime on this thread".to_string()))?;

        let config = Arc::clone(&self.config.read());
        let sink = FileSink::from_config(&config)?;
        let predecessor = self.retired.lock().take();
        let pipeline = Pipeline::spawn(
            &config,
            sink,
            Arc::clone(&self.metrics),
            runtime,
            predecessor,
        );
        let running = (pipeline.queue().clone(), pipeline.runtime().clone());
        *slot = Some(pipeline);
        Ok(running)
    }
}

impl FlushTarget for LoggerInner {
    fn flush_for_background(&self) -> BoxFuture<'static, ()> {
        let accumulator = self
            .pipeline
            .lock()
            .as_ref()
            .map(|p| Arc::clone(p.accumulator()));
        async move {
            if let Some(accumulator) = accumulator {
                let _ = accumulator.flush().await;
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config())
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}
