//! Shared fixtures for integration and load testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use spa_router::{LoadError, RouteDescriptor, Router, ViewHandle, ViewRef};

/// Loader that counts its invocations and takes `delay` to finish.
#[allow(dead_code)]
pub fn counting_view(key: &str, calls: Arc<AtomicU32>, delay: Duration) -> ViewRef {
    let name = key.to_string();
    ViewRef::lazy(key.to_string(), move || {
        let calls = calls.clone();
        let name = name.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(ViewHandle::new(name))
        }
    })
}

/// Loader that fails its first `failures` attempts.
#[allow(dead_code)]
pub fn flaky_view(key: &str, calls: Arc<AtomicU32>, failures: u32) -> ViewRef {
    let name = key.to_string();
    ViewRef::lazy(key.to_string(), move || {
        let calls = calls.clone();
        let name = name.clone();
        async move {
            if calls.fetch_add(1, Ordering::SeqCst) < failures {
                Err(LoadError::failed("chunk request returned 503"))
            } else {
                Ok(ViewHandle::new(name))
            }
        }
    })
}

/// Loader that blocks until `gate` is notified.
#[allow(dead_code)]
pub fn gated_view(key: &str, gate: Arc<Notify>) -> ViewRef {
    let name = key.to_string();
    ViewRef::lazy(key.to_string(), move || {
        let gate = gate.clone();
        let name = name.clone();
        async move {
            gate.notified().await;
            Ok(ViewHandle::new(name))
        }
    })
}

/// The patient-management table, with the lazy view supplied by the caller.
#[allow(dead_code)]
pub fn patient_routes(bluetooth: ViewRef) -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::new("/", ViewRef::eager("LoginPage")).named("login"),
        RouteDescriptor::new("/user", ViewRef::eager("UserPage")).named("user"),
        RouteDescriptor::new("/patient-manage", ViewRef::eager("PatientManage"))
            .named("PatientManage"),
        RouteDescriptor::new("/patient/:id", ViewRef::eager("PatientPage"))
            .named("PatientPage")
            .params_as_props()
            .with_children(vec![RouteDescriptor::new("3d-view", ViewRef::eager("Patient3D"))
                .named("Patient3D")
                .params_as_props()]),
        RouteDescriptor::new("/admin", ViewRef::eager("AdminPage"))
            .named("AdminPage")
            .with_meta("requires", "admin"),
        RouteDescriptor::new("/bluetooth", bluetooth).named("BlueTooth"),
    ]
}

#[allow(dead_code)]
pub fn patient_router() -> Router {
    Router::builder()
        .routes(patient_routes(ViewRef::eager("BlueTooth")))
        .build()
        .unwrap()
}
