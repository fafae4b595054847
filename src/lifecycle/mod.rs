//! Foreground/background tracking.
//!
//! The host reports window creation and destruction. When the last window
//! goes away the monitor schedules a flush; a window appearing before the
//! delay expires cancels it.

mod monitor;
mod windows;

pub use monitor::{AppState, FlushTarget, LifecycleMonitor};
pub use windows::{ForegroundWindowProvider, Window, WindowTracker};

/// Receives window lifecycle notifications.
pub trait LifecycleObserver: Send + Sync {
    fn on_window_created(&self);
    fn on_window_destroyed(&self);
}
