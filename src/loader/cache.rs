//! Module cache with at-most-once-in-flight fetching.
//!
//! # Responsibilities
//! - Materialize lazy views, sharing one fetch between concurrent callers
//! - Cache successful loads for the lifetime of the loader
//! - Reset failed loads so the next request retries
//!
//! # Design Decisions
//! - The fetch runs on its own task; it completes (and caches) even if every
//!   waiter has gone away
//! - Waiters share the outcome through a `watch` channel, so late joiners see
//!   a result that was already sent
//! - A failure reaches every waiter before its entry is reset, and an entry
//!   whose failure was already sent is never joined, only restarted
//! - Shard locks are never held across an await point

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::config::LoaderConfig;
use crate::error::{LoadError, RouterError, RouterResult};
use crate::loader::retry::fetch_with_retry;
use crate::loader::view::{LazyView, ViewHandle, ViewRef};
use crate::observability::metrics;

type SharedOutcome = Option<Result<ViewHandle, LoadError>>;

#[derive(Debug, Clone)]
enum LoadState {
    InFlight(watch::Receiver<SharedOutcome>),
    Ready(ViewHandle),
}

/// Observable state of one module key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    NotStarted,
    InFlight,
    Ready,
    Failed(LoadError),
}

enum Acquired {
    Ready(ViewHandle),
    Wait(watch::Receiver<SharedOutcome>),
}

/// Loads view modules on demand. Clones share one cache.
#[derive(Debug, Clone, Default)]
pub struct ModuleLoader {
    entries: Arc<DashMap<Arc<str>, LoadState>>,
    config: LoaderConfig,
}

impl ModuleLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Materialize the view behind `view`.
    ///
    /// Eager handles are returned as is. Lazy views are fetched at most once
    /// at a time per module key; every concurrent caller receives the same
    /// handle or the same failure.
    pub async fn load(&self, view: &ViewRef) -> RouterResult<ViewHandle> {
        let lazy = match view {
            ViewRef::Eager(handle) => return Ok(handle.clone()),
            ViewRef::Lazy(lazy) => lazy,
        };

        let mut rx = match self.acquire(lazy) {
            Acquired::Ready(handle) => return Ok(handle),
            Acquired::Wait(rx) => rx,
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(shared) => (*shared).clone().unwrap_or(Err(LoadError::Aborted)),
            Err(_) => Err(LoadError::Aborted),
        };

        outcome.map_err(|error| RouterError::ModuleLoadFailed {
            module: lazy.key().to_string(),
            reason: error.to_string(),
        })
    }

    /// Current state of a module key.
    pub fn status(&self, key: &str) -> LoadStatus {
        match self.entries.get(key).as_deref() {
            None => LoadStatus::NotStarted,
            Some(LoadState::Ready(_)) => LoadStatus::Ready,
            // reported but not yet reset
            Some(LoadState::InFlight(rx)) => match &*rx.borrow() {
                None => LoadStatus::InFlight,
                Some(Ok(_)) => LoadStatus::Ready,
                Some(Err(error)) => LoadStatus::Failed(error.clone()),
            },
        }
    }

    /// Number of tracked module keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every cached module. Fetches already running still complete
    /// and repopulate their entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn acquire(&self, lazy: &LazyView) -> Acquired {
        let tx = match self.entries.entry(lazy.shared_key()) {
            Entry::Occupied(mut occupied) => {
                match occupied.get() {
                    LoadState::Ready(handle) => return Acquired::Ready(handle.clone()),
                    LoadState::InFlight(rx) if is_pending(rx) => return Acquired::Wait(rx.clone()),
                    LoadState::InFlight(_) => {}
                }
                let (tx, rx) = watch::channel(None);
                occupied.insert(LoadState::InFlight(rx));
                tx
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(None);
                vacant.insert(LoadState::InFlight(rx));
                tx
            }
        };

        let rx = tx.subscribe();
        self.spawn_fetch(lazy.clone(), tx);
        Acquired::Wait(rx)
    }

    fn spawn_fetch(&self, lazy: LazyView, tx: watch::Sender<SharedOutcome>) {
        let entries = self.entries.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let key = lazy.shared_key();
            tracing::debug!(module = %key, "Fetching module");

            let result = fetch_with_retry(&lazy, &config).await;
            match result {
                Ok(handle) => {
                    entries.insert(key.clone(), LoadState::Ready(handle.clone()));
                    metrics::record_module_load("ready");
                    tracing::debug!(module = %key, view = %handle.name(), "Module ready");
                    tx.send_replace(Some(Ok(handle)));
                }
                Err(error) => {
                    metrics::record_module_load("failed");
                    tracing::warn!(module = %key, error = %error, "Module load failed");

                    let own = tx.subscribe();
                    tx.send_replace(Some(Err(error)));

                    // back to NotStarted, unless a newer fetch already took the slot
                    entries.remove_if(&key, |_, state| {
                        matches!(state, LoadState::InFlight(rx) if rx.same_channel(&own))
                    });
                }
            }
        });
    }
}

/// Whether waiters can still join this fetch: nothing sent yet and the task
/// is alive. A closed sender means the fetch task died without reporting.
fn is_pending(rx: &watch::Receiver<SharedOutcome>) -> bool {
    let reported = rx.borrow().is_some();
    !reported && rx.has_changed().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counting(key: &str, calls: Arc<AtomicU32>, fail_first: u32) -> ViewRef {
        let name = key.to_string();
        ViewRef::lazy(key.to_string(), move || {
            let calls = calls.clone();
            let name = name.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                if calls.fetch_add(1, Ordering::SeqCst) < fail_first {
                    Err(LoadError::failed("network down"))
                } else {
                    Ok(ViewHandle::new(name))
                }
            }
        })
    }

    #[tokio::test]
    async fn test_eager_returns_immediately() {
        let loader = ModuleLoader::default();
        let handle = ViewHandle::new("LoginPage");
        let loaded = loader.load(&ViewRef::Eager(handle.clone())).await.unwrap();
        assert_eq!(loaded, handle);
        assert!(loader.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("BlueTooth", calls.clone(), 0);

        let (a, b) = tokio::join!(loader.load(&view), loader.load(&view));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.status("BlueTooth"), LoadStatus::Ready);

        // cached afterwards
        let c = loader.load(&view).await.unwrap();
        assert_eq!(c, a);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_resets_for_retry() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("BlueTooth", calls.clone(), 1);

        let err = loader.load(&view).await.unwrap_err();
        assert_eq!(
            err,
            RouterError::ModuleLoadFailed {
                module: "BlueTooth".into(),
                reason: "network down".into(),
            }
        );
        assert_eq!(loader.status("BlueTooth"), LoadStatus::NotStarted);

        let handle = loader.load(&view).await.unwrap();
        assert_eq!(handle.name(), "BlueTooth");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("BlueTooth", calls.clone(), u32::MAX);

        let (a, b, c) = tokio::join!(loader.load(&view), loader.load(&view), loader.load(&view));
        let expected = RouterError::ModuleLoadFailed {
            module: "BlueTooth".into(),
            reason: "network down".into(),
        };
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(c.unwrap_err(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.status("BlueTooth"), LoadStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_reported_failure_is_restarted_not_joined() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("BlueTooth", calls.clone(), 0);

        // failure already sent, entry not reset yet
        let (_tx, rx) = watch::channel(Some(Err(LoadError::failed("network down"))));
        loader
            .entries
            .insert(Arc::from("BlueTooth"), LoadState::InFlight(rx));
        assert_eq!(
            loader.status("BlueTooth"),
            LoadStatus::Failed(LoadError::failed("network down"))
        );

        let handle = loader.load(&view).await.unwrap();
        assert_eq!(handle.name(), "BlueTooth");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.status("BlueTooth"), LoadStatus::Ready);
    }

    #[tokio::test]
    async fn test_fetch_completes_without_waiters() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("BlueTooth", calls.clone(), 0);

        let abandoned = tokio::time::timeout(Duration::from_millis(1), loader.load(&view)).await;
        assert!(abandoned.is_err());
        assert_eq!(loader.status("BlueTooth"), LoadStatus::InFlight);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(loader.status("BlueTooth"), LoadStatus::Ready);

        loader.load(&view).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let loader = ModuleLoader::default();
        let calls = Arc::new(AtomicU32::new(0));
        let view = counting("Admin", calls.clone(), 0);

        loader.load(&view).await.unwrap();
        assert_eq!(loader.len(), 1);
        loader.clear();
        assert_eq!(loader.status("Admin"), LoadStatus::NotStarted);

        loader.load(&view).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
