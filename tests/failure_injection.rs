//! Failure injection: broken loaders, timeouts and guards.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use spa_router::config::{LoaderConfig, NavigationConfig};
use spa_router::loader::LoadStatus;
use spa_router::{
    guard_fn, CancelReason, GuardDecision, NavigationGuard, NavigationOutcome, NavigationTarget,
    ResolvedRoute, Router, RouterBuilder, RouterError,
};

mod common;

fn builder(bluetooth: spa_router::ViewRef) -> RouterBuilder {
    Router::builder().routes(common::patient_routes(bluetooth))
}

/// Only lets signed-in users past routes that carry a `requires` meta key.
/// Everyone else goes to login, which learns where to return through `?redirect=`.
struct SessionGuard {
    signed_in: bool,
}

#[async_trait]
impl NavigationGuard for SessionGuard {
    async fn check(&self, to: &ResolvedRoute, _from: Option<&ResolvedRoute>) -> GuardDecision {
        if to.route.meta.contains_key("requires") && !self.signed_in {
            GuardDecision::Redirect(NavigationTarget::path(format!(
                "/?redirect={}",
                urlencoding::encode(&to.full_path)
            )))
        } else {
            GuardDecision::Allow
        }
    }
}

#[tokio::test]
async fn test_load_failure_then_retry() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = builder(common::flaky_view("BlueTooth", calls.clone(), 1))
        .build()
        .unwrap();
    router.navigate("/user").await;

    let outcome = router.navigate("/bluetooth").await;
    assert_eq!(
        outcome,
        NavigationOutcome::Failed(RouterError::ModuleLoadFailed {
            module: "BlueTooth".into(),
            reason: "chunk request returned 503".into(),
        })
    );
    assert_eq!(router.current().unwrap().path, "/user");
    assert_eq!(router.loader().status("BlueTooth"), LoadStatus::NotStarted);

    // the failed entry was reset, so the next navigation fetches again
    assert!(router.navigate("/bluetooth").await.is_committed());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(router.history().entries(), ["/user", "/bluetooth"]);
}

#[tokio::test]
async fn test_configured_retries_hide_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = builder(common::flaky_view("BlueTooth", calls.clone(), 2))
        .loader_config(LoaderConfig {
            retry_attempts: 2,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
            ..Default::default()
        })
        .build()
        .unwrap();

    assert!(router.navigate("/bluetooth").await.is_committed());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_load_timeout() {
    let never = Arc::new(Notify::new());
    let router = builder(common::gated_view("BlueTooth", never))
        .loader_config(LoaderConfig {
            timeout_ms: 20,
            ..Default::default()
        })
        .build()
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(2), router.navigate("/bluetooth"))
        .await
        .expect("timeout should end the navigation");
    assert_eq!(
        outcome.error(),
        Some(&RouterError::ModuleLoadFailed {
            module: "BlueTooth".into(),
            reason: "timed out after 20 ms".into(),
        })
    );
    assert!(router.current().is_none());
}

#[tokio::test]
async fn test_guard_redirects_to_login() {
    let router = builder(spa_router::ViewRef::eager("BlueTooth"))
        .guard(SessionGuard { signed_in: false })
        .build()
        .unwrap();

    let outcome = router.navigate("/admin?tab=users").await;
    let route = outcome.route().unwrap();
    assert_eq!(route.name(), Some("login"));
    assert_eq!(
        route.query.get("redirect").map(String::as_str),
        Some("/admin?tab=users")
    );
    assert_eq!(router.history().entries(), ["/?redirect=%2Fadmin%3Ftab%3Dusers"]);

    let signed_in = builder(spa_router::ViewRef::eager("BlueTooth"))
        .guard(SessionGuard { signed_in: true })
        .build()
        .unwrap();
    assert_eq!(
        signed_in.navigate("/admin").await.route().unwrap().path,
        "/admin"
    );
}

#[tokio::test]
async fn test_guard_cancel_keeps_current_route() {
    let router = builder(spa_router::ViewRef::eager("BlueTooth"))
        .guard(guard_fn(|to: ResolvedRoute, from: Option<ResolvedRoute>| async move {
            let leaving_patient = from.map_or(false, |f| f.name() == Some("PatientPage"));
            if leaving_patient && to.name() == Some("login") {
                GuardDecision::Cancel("unsaved patient notes".into())
            } else {
                GuardDecision::Allow
            }
        }))
        .build()
        .unwrap();

    router.navigate("/patient/42").await;
    let outcome = router.navigate("/").await;
    assert_eq!(
        outcome,
        NavigationOutcome::Cancelled(CancelReason::GuardRejected("unsaved patient notes".into()))
    );
    assert_eq!(router.current().unwrap().path, "/patient/42");
    assert_eq!(router.history().len(), 1);
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let router = builder(spa_router::ViewRef::eager("BlueTooth"))
        .navigation_config(NavigationConfig { max_redirects: 3 })
        .guard(guard_fn(|_to: ResolvedRoute, _from| async move {
            GuardDecision::Redirect(NavigationTarget::path("/user"))
        }))
        .build()
        .unwrap();

    let outcome = router.navigate("/admin").await;
    assert_eq!(outcome, NavigationOutcome::Failed(RouterError::RedirectLimit(3)));
    assert!(router.current().is_none());
    assert!(router.history().is_empty());
}

#[tokio::test]
async fn test_slow_guard_is_superseded() {
    let router = builder(spa_router::ViewRef::eager("BlueTooth"))
        .guard(guard_fn(|to: ResolvedRoute, _from| async move {
            if to.path == "/admin" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            GuardDecision::Allow
        }))
        .build()
        .unwrap();

    let slow = tokio::spawn({
        let router = router.clone();
        async move { router.navigate("/admin").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(router.navigate("/user").await.is_committed());
    assert!(matches!(
        slow.await.unwrap(),
        NavigationOutcome::Cancelled(CancelReason::Superseded { .. })
    ));
    assert_eq!(router.current().unwrap().path, "/user");
}
