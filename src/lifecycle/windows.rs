use super::LifecycleObserver;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A host window (screen, activity, view controller...).
pub trait Window: Send + Sync {
    /// Kind of the window. The tracker keeps at most one live window per kind.
    fn kind(&self) -> &str;

    fn finish(&self);

    fn is_finishing(&self) -> bool {
        false
    }
}

/// Host-side knowledge of which window currently has focus.
pub trait ForegroundWindowProvider: Send + Sync {
    fn foreground_window(&self) -> Option<Arc<dyn Window>>;
}

/// Ordered registry of live windows.
///
/// Registration and removal are forwarded to every observer, which is how
/// a `LifecycleMonitor` learns about foreground/background transitions.
#[derive(Default)]
pub struct WindowTracker {
    windows: Mutex<Vec<Arc<dyn Window>>>,
    observers: RwLock<Vec<Arc<dyn LifecycleObserver>>>,
    provider: Option<Arc<dyn ForegroundWindowProvider>>,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn ForegroundWindowProvider>) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.write().push(observer);
    }

    /// Adds `window`. A live window of the same kind is replaced in place.
    pub fn register(&self, window: Arc<dyn Window>) {
        let replaced = {
            let mut windows = self.windows.lock();
            match windows.iter_mut().find(|w| w.kind() == window.kind()) {
                Some(slot) => Some(std::mem::replace(slot, window)),
                None => {
                    windows.push(window);
                    None
                }
            }
        };

        self.notify_created();
        if replaced.is_some() {
            self.notify_destroyed(1);
        }
    }

    /// Removes `window` if it is the registered instance of its kind.
    pub fn unregister(&self, window: &Arc<dyn Window>) -> bool {
        let removed = {
            let mut windows = self.windows.lock();
            let before = windows.len();
            windows.retain(|w| !Arc::ptr_eq(w, window));
            before - windows.len()
        };
        self.notify_destroyed(removed);
        removed > 0
    }

    /// Removes and finishes `window`.
    pub fn finish(&self, window: &Arc<dyn Window>) {
        self.unregister(window);
        window.finish();
    }

    pub fn finish_all(&self) {
        let drained: Vec<_> = std::mem::take(&mut *self.windows.lock());
        for window in &drained {
            if !window.is_finishing() {
                window.finish();
            }
        }
        self.notify_destroyed(drained.len());
    }

    /// Finishes every window except `keep`, which stays (or becomes) the
    /// only registered window.
    pub fn finish_all_except(&self, keep: &Arc<dyn Window>) {
        let (others, kept) = {
            let mut windows = self.windows.lock();
            let drained = std::mem::take(&mut *windows);
            let (kept, others): (Vec<_>, Vec<_>) =
                drained.into_iter().partition(|w| Arc::ptr_eq(w, keep));
            windows.push(Arc::clone(keep));
            (others, !kept.is_empty())
        };

        for window in &others {
            if !window.is_finishing() {
                window.finish();
            }
        }
        if !kept {
            self.notify_created();
        }
        self.notify_destroyed(others.len());
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.windows.lock().iter().any(|w| w.kind() == kind)
    }

    /// Registered and not finishing.
    pub fn is_alive(&self, kind: &str) -> bool {
        self.get(kind).is_some_and(|w| !w.is_finishing())
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Window>> {
        self.windows.lock().iter().find(|w| w.kind() == kind).cloned()
    }

    pub fn windows(&self) -> Vec<Arc<dyn Window>> {
        self.windows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }

    /// The provider's answer, or the most recently registered window.
    pub fn foreground_window(&self) -> Option<Arc<dyn Window>> {
        self.provider
            .as_ref()
            .and_then(|provider| provider.foreground_window())
            .or_else(|| self.windows.lock().last().cloned())
    }

    fn notify_created(&self) {
        for observer in &*self.observers.read() {
            observer.on_window_created();
        }
    }

    fn notify_destroyed(&self, count: usize) {
        let observers = self.observers.read();
        for _ in 0..count {
            for observer in &*observers {
                observer.on_window_destroyed();
            }
        }
    }
}
