use rask_logkit::lifecycle::Window;
use rask_logkit::{AppState, LogConfig, Logger, StderrConsole, WindowTracker, values};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(start_paused = true)]
async fn test_background_flushes_buffered_entries() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(background_config(dir.path()), Arc::new(StderrConsole));
    let tracker = WindowTracker::new();
    tracker.add_observer(logger.lifecycle());

    let main: Arc<dyn Window> = Arc::new(TestWindow::new("main"));
    tracker.register(Arc::clone(&main));
    assert_eq!(logger.lifecycle().state(), AppState::Foreground);

    logger.i_tag("bg", values!["pending"]);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(logger.metrics().flushes, 0);

    tracker.finish(&main);
    assert_eq!(logger.lifecycle().state(), AppState::Background);
    assert!(logger.lifecycle().has_pending_flush());

    tokio::time::advance(Duration::from_millis(1001)).await;
    wait_for(|| logger.metrics().flushes == 1).await;

    assert_eq!(logger.metrics().flushes, 1);
    let text = std::fs::read_to_string(logger.current_log_file_path()).unwrap();
    assert!(text.trim_end().ends_with("I/bg: pending"));
    logger.release().await;
}

#[tokio::test(start_paused = true)]
async fn test_returning_to_foreground_cancels_flush() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(background_config(dir.path()), Arc::new(StderrConsole));
    let tracker = WindowTracker::new();
    tracker.add_observer(logger.lifecycle());

    let first: Arc<dyn Window> = Arc::new(TestWindow::new("first"));
    tracker.register(Arc::clone(&first));
    logger.i_tag("bg", values!["still buffered"]);
    tokio::time::sleep(Duration::from_millis(10)).await;

    tracker.finish(&first);
    tokio::time::advance(Duration::from_millis(500)).await;
    tracker.register(Arc::new(TestWindow::new("second")));
    assert!(!logger.lifecycle().has_pending_flush());

    tokio::time::advance(Duration::from_millis(2000)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(logger.metrics().flushes, 0);
    assert!(!logger.current_log_file_path().exists());
    logger.release().await;
    assert_eq!(logger.metrics().flushes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_release_cancels_scheduled_background_flush() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(background_config(dir.path()), Arc::new(StderrConsole));
    let tracker = WindowTracker::new();
    tracker.add_observer(logger.lifecycle());

    let main: Arc<dyn Window> = Arc::new(TestWindow::new("main"));
    tracker.register(Arc::clone(&main));
    logger.i_tag("bg", values!["released"]);
    tracker.finish(&main);
    assert!(logger.lifecycle().has_pending_flush());

    logger.release().await;
    assert!(!logger.lifecycle().has_pending_flush());
    assert_eq!(logger.metrics().flushes, 1);

    // A rebuilt pipeline must not be flushed by the old schedule.
    logger.i_tag("bg", values!["buffered after release"]);
    tokio::time::sleep(Duration::from_millis(10)).await;
    tokio::time::advance(Duration::from_millis(1500)).await;
    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(2));
        tokio::task::yield_now().await;
    }

    assert_eq!(logger.metrics().flushes, 1);
    assert!(!logger.lifecycle().has_pending_flush());
    logger.release().await;
    assert_eq!(logger.metrics().flushes, 2);
}

#[test]
fn test_tracker_finishes_windows() {
    let tracker = WindowTracker::new();
    let a = Arc::new(TestWindow::new("a"));
    let b = Arc::new(TestWindow::new("b"));
    let keep: Arc<dyn Window> = b.clone();
    tracker.register(a.clone());
    tracker.register(Arc::clone(&keep));

    tracker.finish_all_except(&keep);

    assert!(a.finished.load(Ordering::SeqCst));
    assert!(!b.finished.load(Ordering::SeqCst));
    assert_eq!(tracker.len(), 1);
    assert!(tracker.contains("b"));
    assert!(!tracker.contains("a"));
}

fn background_config(dir: &Path) -> LogConfig {
    LogConfig::default()
        .with_dir(dir)
        .with_file_switch(true)
        .with_console_switch(false)
        .with_head_switch(false)
        .with_flush_interval_ms(60_000)
        .with_background_flush_delay(Duration::from_millis(1000))
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
        tokio::task::yield_now().await;
    }
}

struct TestWindow {
    kind: String,
    finished: AtomicBool,
}

impl TestWindow {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            finished: AtomicBool::new(false),
        }
    }
}

impl Window for TestWindow {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    fn is_finishing(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}
