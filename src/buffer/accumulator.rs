use super::{AVERAGE_LINE_ESTIMATE, QueueMetrics};
use crate::domain::LogEntry;
use crate::sink::{FileSink, SinkError, spawn_removals};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Text waiting to be written, plus the time of the last flush.
#[derive(Debug)]
struct BufferState {
    text: String,
    last_flush: Instant,
}

/// Collects rendered lines and hands them to the file sink in batches.
///
/// A batch is written once the buffer reaches `buffer_size * 200` bytes or
/// once `flush_interval` has passed since the previous flush. The buffer
/// lock is held across the write, so at most one flush runs at a time and
/// batches reach the file in order.
#[derive(Debug)]
pub struct Accumulator {
    state: Mutex<BufferState>,
    sink: Arc<FileSink>,
    size_threshold: usize,
    flush_interval: Duration,
    metrics: Arc<QueueMetrics>,
}

impl Accumulator {
    pub fn new(
        sink: Arc<FileSink>,
        buffer_size: usize,
        flush_interval: Duration,
        metrics: Arc<QueueMetrics>,
    ) -> Self {
        Self {
            state: Mutex::new(BufferState {
                text: String::new(),
                last_flush: Instant::now(),
            }),
            sink,
            size_threshold: buffer_size.max(1).saturating_mul(AVERAGE_LINE_ESTIMATE),
            flush_interval,
            metrics,
        }
    }

    /// Appends one entry and flushes if either trigger fired.
    pub async fn append(&self, entry: &LogEntry) {
        let mut state = self.state.lock().await;
        state.text.push_str(&entry.render_line());

        if state.text.len() >= self.size_threshold
            || state.last_flush.elapsed() >= self.flush_interval
        {
            // Already reported inside; the batch is gone either way.
            let _ = self.flush_locked(&mut state).await;
        }
    }

    /// Writes whatever is buffered. Returns the file written to, or `None`
    /// when the buffer was empty.
    pub async fn flush(&self) -> Result<Option<PathBuf>, SinkError> {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await
    }

    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.text.len()
    }

    async fn flush_locked(&self, state: &mut BufferState) -> Result<Option<PathBuf>, SinkError> {
        if state.text.is_empty() {
            return Ok(None);
        }

        let batch = std::mem::take(&mut state.text);
        state.last_flush = Instant::now();
        let bytes = batch.len();
        let sink = Arc::clone(&self.sink);

        let written = tokio::task::spawn_blocking(move || sink.write_batch(&batch, Local::now()))
            .await
            .map_err(SinkError::from)
            .and_then(|result| result);

        match written {
            Ok(outcome) => {
                self.metrics.record_flush(bytes);
                tracing::debug!("Flushed {} bytes to {}", bytes, outcome.path.display());
                if !outcome.stale.is_empty() {
                    spawn_removals(outcome.stale);
                }
                Ok(Some(outcome.path))
            }
            Err(e) => {
                self.metrics.record_write_error();
                tracing::error!("Dropping log batch of {} bytes: {}", bytes, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::domain::Severity;
    use tempfile::TempDir;

    fn accumulator(dir: &TempDir, buffer_size: usize) -> (Accumulator, Arc<QueueMetrics>) {
        let config = LogConfig::default().with_dir(dir.path());
        let sink = Arc::new(FileSink::from_config(&config).unwrap());
        let metrics = Arc::new(QueueMetrics::new());
        let acc = Accumulator::new(sink, buffer_size, Duration::from_secs(3600), metrics.clone());
        (acc, metrics)
    }

    #[tokio::test]
    async fn test_empty_flush_is_noop() {
        let dir = TempDir::new().unwrap();
        let (acc, metrics) = accumulator(&dir, 10);

        assert!(acc.flush().await.unwrap().is_none());
        assert_eq!(metrics.snapshot().flushes, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_size_trigger_flushes() {
        let dir = TempDir::new().unwrap();
        let (acc, metrics) = accumulator(&dir, 1);

        acc.append(&LogEntry::new(Severity::Info, "t", ": short")).await;
        assert_eq!(metrics.snapshot().flushes, 0);
        assert!(acc.pending_len().await > 0);

        let long = format!(": {}", "x".repeat(AVERAGE_LINE_ESTIMATE));
        acc.append(&LogEntry::new(Severity::Info, "t", long)).await;

        assert_eq!(metrics.snapshot().flushes, 1);
        assert_eq!(acc.pending_len().await, 0);
    }

    #[tokio::test]
    async fn test_explicit_flush_writes_lines_in_order() {
        let dir = TempDir::new().unwrap();
        let (acc, _) = accumulator(&dir, 10);

        for body in [": one", ": two", ": three"] {
            acc.append(&LogEntry::new(Severity::Debug, "t", body)).await;
        }
        let path = acc.flush().await.unwrap().unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let one = text.find("D/t: one").unwrap();
        let two = text.find("D/t: two").unwrap();
        let three = text.find("D/t: three").unwrap();
        assert!(one < two && two < three);
    }
}
