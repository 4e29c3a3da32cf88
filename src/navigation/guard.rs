//! Navigation guards.
//!
//! Guards run after matching and before the view is loaded, in registration
//! order. The first guard that does not allow the transition decides it.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::navigation::state::NavigationTarget;
use crate::routing::ResolvedRoute;

/// A guard's verdict on a pending transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Abort the navigation with a reason.
    Cancel(String),
    /// Abort and navigate somewhere else instead.
    Redirect(NavigationTarget),
}

#[async_trait]
pub trait NavigationGuard: Send + Sync {
    /// Decide on a transition from `from` (the current route, if any) to `to`.
    async fn check(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> GuardDecision;
}

/// Guard backed by an async closure receiving owned copies of the routes.
pub struct FnGuard<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Build a guard from `|to, from| async move { ... }`.
pub fn guard_fn<F, Fut>(f: F) -> FnGuard<F, Fut>
where
    F: Fn(ResolvedRoute, Option<ResolvedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardDecision> + Send + 'static,
{
    FnGuard {
        f,
        _fut: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> NavigationGuard for FnGuard<F, Fut>
where
    F: Fn(ResolvedRoute, Option<ResolvedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardDecision> + Send + 'static,
{
    async fn check(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> GuardDecision {
        (self.f)(to.clone(), from.cloned()).await
    }
}
