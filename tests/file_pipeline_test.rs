use chrono::{Duration as ChronoDuration, Local};
use parking_lot::Mutex;
use rask_logkit::config::FileWriter;
use rask_logkit::sink::AppendFileWriter;
use rask_logkit::{ConsoleSink, LogConfig, Logger, Severity, values};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HEADER_BORDER: &str = "************* Log Head ****************";

#[tokio::test]
async fn test_empty_flush_is_noop() {
    let dir = TempDir::new().unwrap();
    let (config, heard) = recorded_file_config(dir.path());
    let logger = Logger::new(config, Arc::new(SilentConsole));

    logger.start().unwrap();
    assert_eq!(logger.flush_now().await.unwrap(), None);
    logger.release().await;

    assert!(heard.lock().is_empty());
    assert!(!logger.current_log_file_path().exists());
    assert_eq!(logger.metrics().flushes, 0);
}

#[tokio::test]
async fn test_new_file_starts_with_header() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(
        config
            .with_app_info("Demo", "1.2.3")
            .add_file_extra_head("Channel", "beta"),
        Arc::new(SilentConsole),
    );

    logger.w_tag("boot", values!["ready"]);
    logger.release().await;

    let text = std::fs::read_to_string(logger.current_log_file_path()).unwrap();
    assert!(text.starts_with(HEADER_BORDER));
    assert!(text.contains("App Name"));
    assert!(text.contains(": Demo\n"));
    assert!(text.contains(": 1.2.3\n"));
    assert!(text.contains("Channel"));
    assert!(text.trim_end().ends_with("W/boot: ready"));
    assert_eq!(text.matches(HEADER_BORDER).count(), 2);
}

#[tokio::test]
async fn test_release_drains_and_logger_stays_usable() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(config, Arc::new(SilentConsole));

    logger.i_tag("app", values!["before release"]);
    logger.release().await;
    logger.i_tag("app", values!["after release"]);
    logger.release().await;

    let bodies = bodies(&logger.current_log_file_path(), "I/app: ");
    assert_eq!(bodies, vec!["before release", "after release"]);
    // The header is only written once, when the file is created.
    let text = std::fs::read_to_string(logger.current_log_file_path()).unwrap();
    assert_eq!(text.matches(HEADER_BORDER).count(), 2);
}

#[tokio::test]
async fn test_file_only_ignores_file_switch() {
    let dir = TempDir::new().unwrap();
    let console = Arc::new(CountingConsole::default());
    let config = LogConfig::default()
        .with_dir(dir.path())
        .with_head_switch(false);
    let logger = Logger::new(config, console.clone());

    logger.file(Severity::Info, "audit", &"only on disk");
    logger.release().await;

    assert_eq!(*console.count.lock(), 0);
    assert_eq!(bodies(&logger.current_log_file_path(), "I/audit: "), vec!["only on disk"]);
}

#[tokio::test]
async fn test_file_filter_applies_to_file_only() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(config.with_file_filter(Severity::Error), Arc::new(SilentConsole));

    logger.file(Severity::Warn, "audit", &"below filter");
    logger.e_tag("audit", values!["kept"]);
    logger.release().await;

    assert_eq!(bodies(&logger.current_log_file_path(), "E/audit: "), vec!["kept"]);
    assert!(bodies(&logger.current_log_file_path(), "W/audit: ").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interval_flush_writes_buffered_entries_once() {
    let dir = TempDir::new().unwrap();
    let (config, heard) = recorded_file_config(dir.path());
    let logger = Logger::new(config.with_flush_interval_ms(3000), Arc::new(SilentConsole));

    logger.start().unwrap();
    for body in ["first", "second", "third"] {
        logger.i_tag("tick", values![body]);
    }
    // Let the consumer pick the entries up before the interval elapses.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(logger.metrics().flushes, 0);
    assert!(heard.lock().is_empty());

    tokio::time::advance(Duration::from_millis(3000)).await;
    wait_for(|| logger.metrics().flushes == 1).await;

    let batches: Vec<String> = heard
        .lock()
        .iter()
        .filter(|content| !content.starts_with(HEADER_BORDER))
        .cloned()
        .collect();
    assert_eq!(batches.len(), 1);
    let lines: Vec<&str> = batches[0].lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("I/tick: first"));
    assert!(lines[1].ends_with("I/tick: second"));
    assert!(lines[2].ends_with("I/tick: third"));

    logger.release().await;
    assert_eq!(logger.metrics().flushes, 1);
}

#[tokio::test]
async fn test_size_threshold_triggers_flush() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(
        config.with_buffer_size(1).with_flush_interval_ms(60_000),
        Arc::new(SilentConsole),
    );

    let large = "x".repeat(400);
    logger.i_tag("bulk", values![large]);

    wait_for_real(|| logger.metrics().flushes == 1).await;
    assert_eq!(logger.metrics().flushes, 1);
    logger.release().await;
}

#[tokio::test]
async fn test_retention_removes_expired_files() {
    let dir = TempDir::new().unwrap();
    let today = Local::now().date_naive();
    let expired = dir
        .path()
        .join(format!("util_{}.txt", (today - ChronoDuration::days(8)).format("%Y_%m_%d")));
    let recent = dir
        .path()
        .join(format!("util_{}.txt", (today - ChronoDuration::days(6)).format("%Y_%m_%d")));
    let unrelated = dir.path().join("notes_2000_01_01.txt");
    for path in [&expired, &recent, &unrelated] {
        std::fs::write(path, "old\n").unwrap();
    }

    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(config.with_save_days(7), Arc::new(SilentConsole));
    logger.i_tag("retention", values!["creates today's file"]);
    logger.release().await;

    wait_for_real(|| !expired.exists()).await;
    assert!(!expired.exists());
    assert!(recent.exists());
    assert!(unrelated.exists());
    assert!(logger.current_log_file_path().exists());
}

#[tokio::test]
async fn test_custom_file_writer_receives_output() {
    let dir = TempDir::new().unwrap();
    let written = Arc::new(Mutex::new(String::new()));
    let logger = Logger::new(
        LogConfig::default()
            .with_dir(dir.path())
            .with_file_switch(true)
            .with_console_switch(false)
            .with_file_writer(Arc::new(MemoryWriter(Arc::clone(&written)))),
        Arc::new(SilentConsole),
    );

    logger.e_tag("mem", values!["kept in memory"]);
    logger.release().await;

    let text = written.lock().clone();
    assert!(text.starts_with(HEADER_BORDER));
    assert!(text.contains("E/mem"));
    assert!(text.trim_end().ends_with("kept in memory"));
    // The file is still created; only the appends go through the writer.
    let on_disk = std::fs::read_to_string(logger.current_log_file_path()).unwrap();
    assert!(on_disk.is_empty());
}

#[tokio::test]
async fn test_full_queue_counts_dropped_entries() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    // Console output switched on makes file delivery non-blocking.
    let logger = Logger::new(
        config.with_console_switch(true).with_queue_capacity(1),
        Arc::new(SilentConsole),
    );

    for body in ["one", "two", "three"] {
        logger.i_tag("burst", values![body]);
    }

    let metrics = logger.metrics();
    assert_eq!(metrics.enqueued, 1);
    assert_eq!(metrics.dropped, 2);

    logger.release().await;
    assert_eq!(bodies(&logger.current_log_file_path(), "I/burst: "), vec!["one"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_keeps_order_with_slow_writes() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(
        config
            .with_buffer_size(5)
            .with_file_writer(Arc::new(SlowWriter(Duration::from_millis(50)))),
        Arc::new(SilentConsole),
    );

    let pad = "x".repeat(40);
    for i in 0..100 {
        logger.i_tag("order", values![format!("old{i} {pad}")]);
    }
    logger.stop();
    logger.i_tag("order", values!["new"]);
    logger.release().await;

    let mut expected: Vec<String> = (0..100).map(|i| format!("old{i} {pad}")).collect();
    expected.push("new".to_string());
    assert_eq!(bodies(&logger.current_log_file_path(), "I/order: "), expected);
    let text = std::fs::read_to_string(logger.current_log_file_path()).unwrap();
    assert_eq!(text.matches(HEADER_BORDER).count(), 2);
}

#[tokio::test]
async fn test_full_queue_without_console_keeps_order() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(config.with_queue_capacity(4), Arc::new(SilentConsole));

    for i in 0..200 {
        logger.i_tag("f", values![i]);
    }
    logger.release().await;

    let expected: Vec<String> = (0..200).map(|i| i.to_string()).collect();
    assert_eq!(bodies(&logger.current_log_file_path(), "I/f: "), expected);
    let metrics = logger.metrics();
    assert_eq!(metrics.enqueued, 200);
    assert_eq!(metrics.dropped, 0);
}

#[tokio::test]
async fn test_reconfigure_switches_file_prefix() {
    let dir = TempDir::new().unwrap();
    let (config, _) = recorded_file_config(dir.path());
    let logger = Logger::new(config.clone(), Arc::new(SilentConsole));

    logger.i_tag("cfg", values!["old prefix"]);
    logger.release().await;
    logger.reconfigure(config.with_file_prefix("audit"));
    logger.i_tag("cfg", values!["new prefix"]);
    logger.release().await;

    let path = logger.current_log_file_path();
    assert!(
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("audit_"))
    );
    assert_eq!(bodies(&path, "I/cfg: "), vec!["new prefix"]);
    assert_eq!(logger.log_files(), vec![path]);
}

fn recorded_file_config(dir: &Path) -> (LogConfig, Arc<Mutex<Vec<String>>>) {
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heard);
    let config = LogConfig::default()
        .with_dir(dir)
        .with_file_switch(true)
        .with_console_switch(false)
        .with_head_switch(false)
        .with_file_listener(Arc::new(move |_: &Path, content: &str| {
            sink.lock().push(content.to_string());
        }));
    (config, heard)
}

fn bodies(path: &Path, marker: &str) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter_map(|line| line.split_once(marker).map(|(_, body)| body.to_string()))
        .collect()
}

/// Polls `condition` while letting blocking writes finish, without moving
/// a paused clock.
async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
        tokio::task::yield_now().await;
    }
}

async fn wait_for_real(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

struct SilentConsole;

impl ConsoleSink for SilentConsole {
    fn write(&self, _severity: Severity, _tag: &str, _message: &str) {}
}

#[derive(Default)]
struct CountingConsole {
    count: Mutex<usize>,
}

impl ConsoleSink for CountingConsole {
    fn write(&self, _severity: Severity, _tag: &str, _message: &str) {
        *self.count.lock() += 1;
    }
}

/// Appends to disk, pausing before large batches.
struct SlowWriter(Duration);

impl FileWriter for SlowWriter {
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if content.len() > 200 {
            std::thread::sleep(self.0);
        }
        AppendFileWriter.write(path, content)
    }
}

struct MemoryWriter(Arc<Mutex<String>>);

impl FileWriter for MemoryWriter {
    fn write(&self, _path: &Path, content: &str) -> std::io::Result<()> {
        self.0.lock().push_str(content);
        Ok(())
    }
}
