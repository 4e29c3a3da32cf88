//! Navigation state machine.
//!
//! # Responsibilities
//! - Drive each navigation through matching, guards, loading and commit
//! - Let only the most recently initiated navigation commit
//! - Own the current route, the history record and the view publisher
//!
//! # Design Decisions
//! - Every navigation takes a generation number; after each suspension point
//!   it compares against the latest one and stands down if it lost
//! - Superseded work is not aborted, its result is simply never committed
//! - Commit is synchronous and happens under the history lock, so the
//!   current route, the record and the published view change together
//! - A traversal re-checks its entry under that lock; if another commit
//!   shifted the record in the meantime it is pushed instead

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::{ArcSwap, ArcSwapOption};
use futures_util::future::BoxFuture;
use tokio::sync::watch;

use crate::config::{HistoryConfig, NavigationConfig};
use crate::error::{RouterError, RouterResult};
use crate::loader::{ModuleLoader, ViewHandle};
use crate::navigation::guard::{GuardDecision, NavigationGuard};
use crate::navigation::history::NavigationRecord;
use crate::navigation::state::{
    ActiveView, CancelReason, HistoryMode, NavigationOutcome, NavigationState, NavigationTarget,
    Transition,
};
use crate::observability::metrics;
use crate::routing::{Matcher, ResolvedRoute, RouteTable};

/// Receiver side of the active-view channel.
pub type ViewSubscription = watch::Receiver<Option<Arc<ActiveView>>>;

/// Runs navigations against a shared, swappable route table.
pub struct NavigationController {
    table: Arc<ArcSwap<RouteTable>>,
    loader: ModuleLoader,
    guards: Vec<Arc<dyn NavigationGuard>>,
    latest: AtomicU64,
    current: ArcSwapOption<ResolvedRoute>,
    history: Mutex<NavigationRecord>,
    publisher: watch::Sender<Option<Arc<ActiveView>>>,
    config: NavigationConfig,
}

impl NavigationController {
    pub fn new(
        table: Arc<ArcSwap<RouteTable>>,
        loader: ModuleLoader,
        navigation: NavigationConfig,
        history: &HistoryConfig,
    ) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            table,
            loader,
            guards: Vec::new(),
            latest: AtomicU64::new(0),
            current: ArcSwapOption::empty(),
            history: Mutex::new(NavigationRecord::new(history.max_entries)),
            publisher,
            config: navigation,
        }
    }

    /// Append a guard. Guards run in the order they were added.
    pub fn add_guard(&mut self, guard: Arc<dyn NavigationGuard>) {
        self.guards.push(guard);
    }

    /// Navigate and append the result to history.
    pub async fn navigate(&self, target: impl Into<NavigationTarget>) -> NavigationOutcome {
        self.start(target.into(), HistoryMode::Push).await
    }

    /// Navigate and overwrite the current history entry.
    pub async fn replace(&self, target: impl Into<NavigationTarget>) -> NavigationOutcome {
        self.start(target.into(), HistoryMode::Replace).await
    }

    /// Re-navigate to the history entry `delta` steps from the cursor. The
    /// cursor only moves if that navigation commits.
    pub async fn go(&self, delta: isize) -> NavigationOutcome {
        let entry = {
            let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            history
                .target(delta)
                .map(|index| (index, history.entries()[index].clone()))
        };

        match entry {
            Some((index, path)) => {
                let mode = HistoryMode::Traverse {
                    index,
                    entry: path.clone(),
                };
                self.start(NavigationTarget::Path(path), mode).await
            }
            None => {
                tracing::warn!(delta, "History traversal out of range");
                let outcome = NavigationOutcome::Failed(RouterError::HistoryOutOfRange(delta));
                metrics::record_navigation(outcome.label());
                outcome
            }
        }
    }

    pub async fn back(&self) -> NavigationOutcome {
        self.go(-1).await
    }

    pub async fn forward(&self) -> NavigationOutcome {
        self.go(1).await
    }

    /// The committed current route.
    pub fn current(&self) -> Option<Arc<ResolvedRoute>> {
        self.current.load_full()
    }

    /// The most recently published view.
    pub fn active(&self) -> Option<Arc<ActiveView>> {
        self.publisher.borrow().clone()
    }

    /// Snapshot of the history record.
    pub fn history(&self) -> NavigationRecord {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to committed views. The receiver starts with the current
    /// value marked as seen.
    pub fn subscribe(&self) -> ViewSubscription {
        self.publisher.subscribe()
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    async fn start(&self, target: NavigationTarget, mode: HistoryMode) -> NavigationOutcome {
        let outcome = self.run(target, mode, 0).await;
        metrics::record_navigation(outcome.label());
        outcome
    }

    fn run(
        &self,
        target: NavigationTarget,
        mode: HistoryMode,
        redirects: usize,
    ) -> BoxFuture<'_, NavigationOutcome> {
        Box::pin(async move {
            let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            let mut transition = Transition::new(id);
            tracing::debug!(navigation_id = id, target = ?target, "Navigation started");

            transition.advance(NavigationState::Matching);
            let table = self.table.load_full();
            let resolved = match resolve_target(&table, &target) {
                Ok(resolved) => resolved,
                Err(error) => return self.fail(&mut transition, error),
            };
            let from = self.current.load_full();

            transition.advance(NavigationState::Guarding);
            for guard in &self.guards {
                let decision = guard.check(&resolved, from.as_deref()).await;
                if let Some(outcome) = self.superseded(&mut transition) {
                    return outcome;
                }

                match decision {
                    GuardDecision::Allow => {}
                    GuardDecision::Cancel(reason) => {
                        transition.advance(NavigationState::Cancelled);
                        tracing::warn!(
                            navigation_id = id,
                            path = %resolved.full_path,
                            reason = %reason,
                            "Navigation rejected by guard"
                        );
                        return NavigationOutcome::Cancelled(CancelReason::GuardRejected(reason));
                    }
                    GuardDecision::Redirect(next) => {
                        if redirects >= self.config.max_redirects {
                            return self.fail(
                                &mut transition,
                                RouterError::RedirectLimit(self.config.max_redirects),
                            );
                        }
                        transition.advance(NavigationState::Cancelled);
                        tracing::debug!(
                            navigation_id = id,
                            from = %resolved.full_path,
                            to = ?next,
                            "Navigation redirected by guard"
                        );
                        let mode = match mode {
                            HistoryMode::Replace => HistoryMode::Replace,
                            HistoryMode::Push | HistoryMode::Traverse { .. } => HistoryMode::Push,
                        };
                        return self.run(next, mode, redirects + 1).await;
                    }
                }
            }

            transition.advance(NavigationState::Loading);
            let loaded = self.loader.load(&resolved.route.view).await;
            if let Some(outcome) = self.superseded(&mut transition) {
                return outcome;
            }
            let view = match loaded {
                Ok(view) => view,
                Err(error) => return self.fail(&mut transition, error),
            };

            transition.advance(NavigationState::Committing);
            self.commit(&mut transition, resolved, view, mode)
        })
    }

    fn commit(
        &self,
        transition: &mut Transition,
        resolved: ResolvedRoute,
        view: ViewHandle,
        mode: HistoryMode,
    ) -> NavigationOutcome {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(outcome) = self.superseded(transition) {
            return outcome;
        }

        let route = Arc::new(resolved);
        match mode {
            HistoryMode::Push if history.current() == Some(route.full_path.as_str()) => {}
            HistoryMode::Push => history.push(route.full_path.clone()),
            HistoryMode::Replace => history.replace(route.full_path.clone()),
            HistoryMode::Traverse { index, entry } => {
                if !history.move_to(index, &entry, route.full_path.clone()) {
                    tracing::debug!(
                        navigation_id = transition.id,
                        index,
                        entry = %entry,
                        "History shifted during traversal, pushing instead"
                    );
                    history.push(route.full_path.clone());
                }
            }
        }

        self.current.store(Some(route.clone()));
        self.publisher.send_replace(Some(Arc::new(ActiveView {
            route: route.clone(),
            view,
            props: route.props(),
        })));
        transition.advance(NavigationState::Committed);
        drop(history);

        tracing::info!(
            navigation_id = transition.id,
            path = %route.full_path,
            route = %route.route.label(),
            "Navigation committed"
        );
        NavigationOutcome::Committed(route)
    }

    fn superseded(&self, transition: &mut Transition) -> Option<NavigationOutcome> {
        let latest = self.latest.load(Ordering::SeqCst);
        if latest == transition.id {
            return None;
        }
        transition.advance(NavigationState::Cancelled);
        tracing::debug!(
            navigation_id = transition.id,
            superseded_by = latest,
            "Navigation superseded"
        );
        Some(NavigationOutcome::Cancelled(CancelReason::Superseded { by: latest }))
    }

    fn fail(&self, transition: &mut Transition, error: RouterError) -> NavigationOutcome {
        transition.advance(NavigationState::Failed);
        tracing::warn!(navigation_id = transition.id, error = %error, "Navigation failed");
        NavigationOutcome::Failed(error)
    }
}

fn resolve_target(table: &RouteTable, target: &NavigationTarget) -> RouterResult<ResolvedRoute> {
    let matcher = Matcher::new(table);
    match target {
        NavigationTarget::Path(path) => matcher.resolve(path),
        NavigationTarget::Named { name, params } => matcher.resolve_named(name, params),
    }
}
