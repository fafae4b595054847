use super::LifecycleObserver;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// At least one window is alive.
    Foreground,
    /// No window is alive.
    Background,
}

/// Whatever gets flushed when the application goes to the background.
pub trait FlushTarget: Send + Sync {
    fn flush_for_background(&self) -> BoxFuture<'static, ()>;
}

#[derive(Debug)]
struct MonitorState {
    active: usize,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

/// Counts live windows and flushes the target shortly after the count
/// drops to zero.
pub struct LifecycleMonitor {
    state: Arc<Mutex<MonitorState>>,
    target: Weak<dyn FlushTarget>,
    runtime: Option<Handle>,
}

impl LifecycleMonitor {
    pub fn new(target: Weak<dyn FlushTarget>, delay: Duration, runtime: Option<Handle>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MonitorState {
                active: 0,
                delay,
                pending: None,
            })),
            target,
            runtime,
        }
    }

    pub fn state(&self) -> AppState {
        if self.state.lock().active > 0 {
            AppState::Foreground
        } else {
            AppState::Background
        }
    }

    pub fn active_windows(&self) -> usize {
        self.state.lock().active
    }

    pub fn delay(&self) -> Duration {
        self.state.lock().delay
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    pub fn has_pending_flush(&self) -> bool {
        self.state
            .lock()
            .pending
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Aborts a scheduled background flush, if any.
    pub fn cancel_pending(&self) {
        if let Some(pending) = self.state.lock().pending.take() {
            pending.abort();
            tracing::debug!("Background flush cancelled");
        }
    }

    fn schedule_flush(&self, state: &mut MonitorState) {
        let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            tracing::warn!("No tokio runtime available, background flush skipped");
            return;
        };

        let shared = Arc::clone(&self.state);
        let target = self.target.clone();
        let delay = state.delay;

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_background = shared.lock().active == 0;
            if !still_background {
                return;
            }
            if let Some(target) = target.upgrade() {
                tracing::debug!("Application in background, flushing logs");
                target.flush_for_background().await;
            }
        });

        if let Some(previous) = state.pending.replace(task) {
            previous.abort();
        }
    }
}

impl LifecycleObserver for LifecycleMonitor {
    fn on_window_created(&self) {
        let mut state = self.state.lock();
        state.active += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
            tracing::debug!("Window created, background flush cancelled");
        }
    }

    fn on_window_destroyed(&self) {
        let mut state = self.state.lock();
        state.active = state.active.saturating_sub(1);
        if state.active == 0 {
            self.schedule_flush(&mut state);
        }
    }
}

impl std::fmt::Debug for LifecycleMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LifecycleMonitor")
            .field("active", &state.active)
            .field("delay", &state.delay)
            .finish_non_exhaustive()
    }
}
