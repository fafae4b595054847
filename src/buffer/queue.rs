use super::{QueueError, QueueMetrics};
use crate::domain::LogEntry;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;

/// Entries that found the queue full, in call order, and the one task
/// moving them into the channel.
#[derive(Debug, Default)]
struct Backlog {
    entries: VecDeque<LogEntry>,
    drainer: Option<JoinHandle<()>>,
    draining: bool,
}

/// Producer side of the bounded entry queue. Cheap to clone; the single
/// consumer holds the matching `Receiver`.
///
/// While the backlog is non-empty every waiting producer joins it, so
/// entries reach the consumer in the order they were submitted.
#[derive(Debug, Clone)]
pub struct LogQueue {
    sender: Sender<LogEntry>,
    backlog: Arc<Mutex<Backlog>>,
    metrics: Arc<QueueMetrics>,
}

impl LogQueue {
    pub fn bounded(capacity: usize, metrics: Arc<QueueMetrics>) -> (Self, Receiver<LogEntry>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let queue = Self {
            sender,
            backlog: Arc::new(Mutex::new(Backlog::default())),
            metrics,
        };
        (queue, receiver)
    }

    /// Non-blocking enqueue. A full queue, or one with entries still
    /// waiting in the backlog, drops the entry.
    pub fn offer(&self, entry: LogEntry) -> Result<(), QueueError> {
        let result = if self.backlog.lock().draining {
            Err(TrySendError::Full(entry))
        } else {
            self.sender.try_send(entry)
        };
        match result {
            Ok(()) => {
                self.metrics.record_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                let dropped = self.metrics.record_dropped();
                tracing::warn!("Log queue full, dropped entry ({} dropped so far)", dropped);
                Err(QueueError::Full)
            }
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Waits for a free slot.
    pub async fn send(&self, entry: LogEntry) -> Result<(), QueueError> {
        self.sender
            .send(entry)
            .await
            .map_err(|_| QueueError::Closed)?;
        self.metrics.record_enqueued();
        Ok(())
    }

    /// Enqueue from synchronous code without dropping. When the queue is
    /// full the entry goes to the backlog, which a single task on `runtime`
    /// feeds into the queue as space frees.
    pub fn enqueue_or_wait(&self, entry: LogEntry, runtime: &Handle) -> Result<(), QueueError> {
        let mut backlog = self.backlog.lock();
        if backlog.draining {
            backlog.entries.push_back(entry);
            return Ok(());
        }

        match self.sender.try_send(entry) {
            Ok(()) => {
                self.metrics.record_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(entry)) => {
                backlog.entries.push_back(entry);
                backlog.draining = true;
                backlog.drainer = Some(runtime.spawn(drain_backlog(self.clone())));
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Resolves once the backlog is empty and its task has finished.
    pub async fn settled(&self) {
        loop {
            let drainer = self.backlog.lock().drainer.take();
            match drainer {
                Some(drainer) => {
                    if let Err(e) = drainer.await {
                        tracing::error!("Log backlog task failed: {}", e);
                    }
                }
                None => return,
            }
        }
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().entries.len()
    }
}

async fn drain_backlog(queue: LogQueue) {
    loop {
        let next = {
            let mut backlog = queue.backlog.lock();
            match backlog.entries.pop_front() {
                Some(entry) => entry,
                None => {
                    backlog.draining = false;
                    return;
                }
            }
        };

        if queue.send(next).await.is_err() {
            let mut backlog = queue.backlog.lock();
            let lost = backlog.entries.len() + 1;
            backlog.entries.clear();
            backlog.draining = false;
            tracing::debug!("Queue closed, {} deferred log entries not delivered", lost);
            return;
        }
    }
}
