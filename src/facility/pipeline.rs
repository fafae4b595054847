use crate::buffer::{Accumulator, LogQueue, QueueMetrics};
use crate::config::LogConfig;
use crate::domain::LogEntry;
use crate::sink::FileSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error};

/// Queue, accumulator and the two background tasks draining into it.
///
/// Dropping a pipeline cancels its tasks; the consumer still drains what
/// was queued and flushes before exiting.
pub(crate) struct Pipeline {
    queue: LogQueue,
    accumulator: Arc<Accumulator>,
    runtime: Handle,
    consumer: JoinHandle<()>,
    ticker: JoinHandle<()>,
    cancel: DropGuard,
}

/// Tasks of a stopped pipeline, still writing out what was queued.
pub(crate) struct Retired {
    consumer: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl Retired {
    pub(crate) async fn finished(self) {
        if let Err(e) = self.consumer.await {
            error!("Log consumer task failed: {}", e);
        }
        if let Err(e) = self.ticker.await
            && !e.is_cancelled()
        {
            error!("Log flush ticker failed: {}", e);
        }
    }
}

impl Pipeline {
    /// Starts the tasks. With a `predecessor`, nothing is appended until
    /// the predecessor has written its last entry, so files keep call order
    /// across restarts.
    pub(crate) fn spawn(
        config: &LogConfig,
        sink: FileSink,
        metrics: Arc<QueueMetrics>,
        runtime: Handle,
        predecessor: Option<Retired>,
    ) -> Self {
        let settings = config.settings();
        let accumulator = Arc::new(Accumulator::new(
            Arc::new(sink),
            settings.buffer_size,
            settings.flush_interval,
            Arc::clone(&metrics),
        ));
        let (queue, receiver) = LogQueue::bounded(settings.queue_capacity, metrics);
        let cancel = CancellationToken::new();

        let consumer = runtime.spawn(consume(
            receiver,
            queue.clone(),
            Arc::clone(&accumulator),
            cancel.clone(),
            predecessor,
        ));
        let ticker = runtime.spawn(tick(
            Arc::clone(&accumulator),
            settings.flush_interval,
            cancel.clone(),
        ));

        debug!(
            "Log pipeline started (capacity {}, interval {:?})",
            settings.queue_capacity, settings.flush_interval
        );

        Self {
            queue,
            accumulator,
            runtime,
            consumer,
            ticker,
            cancel: cancel.drop_guard(),
        }
    }

    pub(crate) fn queue(&self) -> &LogQueue {
        &self.queue
    }

    pub(crate) fn accumulator(&self) -> &Arc<Accumulator> {
        &self.accumulator
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.consumer.is_finished()
    }

    /// Cancels the tasks without waiting for them.
    pub(crate) fn retire(self) -> Retired {
        let Self {
            consumer,
            ticker,
            cancel,
            ..
        } = self;
        drop(cancel);
        Retired { consumer, ticker }
    }

    /// Cancels the tasks and waits until queued entries are written.
    pub(crate) async fn shutdown(self) {
        self.retire().finished().await;
    }
}

async fn consume(
    mut receiver: Receiver<LogEntry>,
    queue: LogQueue,
    accumulator: Arc<Accumulator>,
    cancel: CancellationToken,
    predecessor: Option<Retired>,
) {
    if let Some(predecessor) = predecessor {
        predecessor.finished().await;
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            entry = receiver.recv() => match entry {
                Some(entry) => accumulator.append(&entry).await,
                None => break,
            },
        }
    }

    // Entries deferred by a full queue still belong to this pipeline.
    let settled = queue.settled();
    tokio::pin!(settled);
    loop {
        tokio::select! {
            biased;
            entry = receiver.recv() => match entry {
                Some(entry) => accumulator.append(&entry).await,
                None => break,
            },
            () = &mut settled => break,
        }
    }

    receiver.close();
    let mut drained = 0usize;
    while let Some(entry) = receiver.recv().await {
        accumulator.append(&entry).await;
        drained += 1;
    }
    if drained > 0 {
        debug!("Drained {} queued log entries", drained);
    }

    // Failures were already reported by the accumulator.
    let _ = accumulator.flush().await;
}

async fn tick(accumulator: Arc<Accumulator>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let _ = accumulator.flush().await;
            }
        }
    }
}
