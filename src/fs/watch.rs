//! Shared directory watches.
//!
//! Both panels may show the same directory; the registry keeps one OS-level
//! watch per path and fans events out to every subscriber of that path.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::Watcher;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Called with the changed path, or with the watched path and an error.
pub type WatchCallback = Arc<dyn Fn(&Path, Option<&AppError>) + Send + Sync>;

/// A live OS-level watch. Closing it stops event delivery.
pub trait ActiveWatch: Send {
    fn close(self: Box<Self>);
}

/// Creates OS-level watches. Split out so the registry can be tested
/// without touching inotify.
pub trait WatchBackend: Send + Sync {
    fn watch(&self, path: &Path, sink: WatchCallback) -> Result<Box<dyn ActiveWatch>>;
}

/// Backend built on `notify-debouncer-mini`, watching a single directory
/// level.
pub struct NotifyBackend {
    debounce: Duration,
}

impl NotifyBackend {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for NotifyBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

struct NotifyWatch {
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl ActiveWatch for NotifyWatch {
    // Dropping the debouncer stops its thread and the inotify watch.
    fn close(self: Box<Self>) {}
}

fn create_failed(path: &Path, err: notify::Error) -> AppError {
    AppError::WatchCreateFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&self, path: &Path, sink: WatchCallback) -> Result<Box<dyn ActiveWatch>> {
        let watched = path.to_path_buf();
        let mut debouncer = new_debouncer(
            self.debounce,
            move |result: std::result::Result<
                Vec<notify_debouncer_mini::DebouncedEvent>,
                notify::Error,
            >| match result {
                Ok(events) => {
                    // One notification per batch is enough; subscribers reread the directory.
                    if let Some(event) = events.iter().find(|e| e.kind == DebouncedEventKind::Any)
                    {
                        sink(&event.path, None);
                    }
                }
                Err(err) => sink(&watched, Some(&AppError::Watch(err.to_string()))),
            },
        )
        .map_err(|e| create_failed(path, e))?;

        debouncer
            .watcher()
            .watch(path, notify::RecursiveMode::NonRecursive)
            .map_err(|e| create_failed(path, e))?;

        Ok(Box::new(NotifyWatch {
            _debouncer: debouncer,
        }))
    }
}

/// Proof of a registration. Consumed by [`WatchRegistry::unsubscribe`] or
/// handed back to [`WatchRegistry::subscribe`] when moving elsewhere.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    path: PathBuf,
}

impl Subscription {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct WatcherHandle {
    subscribers: Mutex<BTreeMap<u64, WatchCallback>>,
    watch: Mutex<Option<Box<dyn ActiveWatch>>>,
}

impl WatcherHandle {
    fn new() -> Self {
        Self {
            subscribers: Mutex::new(BTreeMap::new()),
            watch: Mutex::new(None),
        }
    }

    fn attach(&self, id: u64, callback: WatchCallback) {
        lock(&self.subscribers).insert(id, callback);
    }

    /// Returns true when no subscribers remain.
    fn detach(&self, id: u64) -> bool {
        let mut subscribers = lock(&self.subscribers);
        subscribers.remove(&id);
        subscribers.is_empty()
    }

    fn dispatch(&self, path: &Path, err: Option<&AppError>) {
        let subscribers = lock(&self.subscribers);
        for callback in subscribers.values() {
            callback(path, err);
        }
    }

    fn close(&self) {
        let watch = lock(&self.watch).take();
        if let Some(watch) = watch {
            watch.close();
        }
    }
}

/// Process-wide table of watched directories.
pub struct WatchRegistry {
    backend: Arc<dyn WatchBackend>,
    handles: Mutex<HashMap<PathBuf, Arc<WatcherHandle>>>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl WatchRegistry {
    pub fn new(backend: Arc<dyn WatchBackend>) -> Self {
        Self {
            backend,
            handles: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` for changes in `path`, releasing `previous`
    /// first.
    ///
    /// The previous path's watch is closed when its last subscriber leaves,
    /// unless it is the path being subscribed to. If a new OS watch cannot be
    /// created nothing is registered and `WatchCreateFailed` is returned; the
    /// previous subscription stays released either way.
    pub fn subscribe(
        &self,
        previous: Option<Subscription>,
        path: &Path,
        callback: WatchCallback,
    ) -> Result<Subscription> {
        let mut handles = lock(&self.handles);

        if let Some(previous) = previous {
            Self::release(&mut handles, previous, Some(path));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if let Some(handle) = handles.get(path) {
            handle.attach(id, callback);
            debug!(path = %path.display(), id, "joined existing watch");
            return Ok(Subscription {
                id,
                path: path.to_path_buf(),
            });
        }

        let handle = Arc::new(WatcherHandle::new());
        let weak = Arc::downgrade(&handle);
        let sink: WatchCallback = Arc::new(move |changed: &Path, err: Option<&AppError>| {
            if let Some(handle) = weak.upgrade() {
                handle.dispatch(changed, err);
            }
        });

        let watch = self.backend.watch(path, sink).map_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to create watch");
            err
        })?;
        *lock(&handle.watch) = Some(watch);
        handle.attach(id, callback);
        handles.insert(path.to_path_buf(), handle);
        debug!(path = %path.display(), id, "created watch");

        Ok(Subscription {
            id,
            path: path.to_path_buf(),
        })
    }

    /// Drop a subscription, closing the OS watch if it was the last one.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut handles = lock(&self.handles);
        Self::release(&mut handles, subscription, None);
    }

    fn release(
        handles: &mut HashMap<PathBuf, Arc<WatcherHandle>>,
        subscription: Subscription,
        keep: Option<&Path>,
    ) {
        let Some(handle) = handles.get(&subscription.path) else {
            return;
        };
        let empty = handle.detach(subscription.id);
        if empty && keep != Some(subscription.path.as_path()) {
            if let Some(handle) = handles.remove(&subscription.path) {
                handle.close();
                debug!(path = %subscription.path.display(), "closed watch");
            }
        }
    }

    /// Paths that currently hold an OS watch.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = lock(&self.handles).keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn subscriber_count(&self, path: &Path) -> usize {
        lock(&self.handles)
            .get(path)
            .map(|handle| lock(&handle.subscribers).len())
            .unwrap_or(0)
    }

    /// Close every watch. Used on shutdown.
    pub fn close_all(&self) {
        let drained: Vec<_> = lock(&self.handles).drain().collect();
        for (_, handle) in drained {
            handle.close();
        }
    }
}

/// In-memory backend that records watch creation and closing.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    pub struct FakeBackend {
        created: Mutex<Vec<PathBuf>>,
        closed: Arc<Mutex<Vec<PathBuf>>>,
        sinks: Mutex<HashMap<PathBuf, WatchCallback>>,
        failing: HashSet<PathBuf>,
    }

    struct FakeWatch {
        path: PathBuf,
        closed: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ActiveWatch for FakeWatch {
        fn close(self: Box<Self>) {
            self.closed.lock().unwrap().push(self.path.clone());
        }
    }

    impl WatchBackend for FakeBackend {
        fn watch(&self, path: &Path, sink: WatchCallback) -> Result<Box<dyn ActiveWatch>> {
            if self.failing.contains(path) {
                return Err(AppError::WatchCreateFailed {
                    path: path.to_path_buf(),
                    reason: "refused".into(),
                });
            }
            self.created.lock().unwrap().push(path.to_path_buf());
            self.sinks.lock().unwrap().insert(path.to_path_buf(), sink);
            Ok(Box::new(FakeWatch {
                path: path.to_path_buf(),
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    impl FakeBackend {
        /// A backend that refuses to watch any of `paths`.
        pub fn failing_on(paths: &[&Path]) -> Self {
            Self {
                failing: paths.iter().map(|p| p.to_path_buf()).collect(),
                ..Default::default()
            }
        }

        pub fn emit(&self, path: &Path, err: Option<&AppError>) {
            let sink = self.sinks.lock().unwrap().get(path).cloned();
            if let Some(sink) = sink {
                sink(path, err);
            }
        }

        pub fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        pub fn closed(&self) -> Vec<PathBuf> {
            self.closed.lock().unwrap().clone()
        }
    }
}
