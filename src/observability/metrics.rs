//! Metrics collection.
//!
//! # Metrics
//! - `router_navigations_total` (counter): terminal navigations by outcome
//! - `router_module_loads_total` (counter): lazy module fetches by result
//! - `router_routes_registered` (gauge): routes in the most recent table
//!
//! # Design Decisions
//! - Recording is a no-op until the host installs a recorder
//! - Labels are static strings to keep cardinality bounded

/// Record a terminal navigation outcome (`committed`, `cancelled`, `failed`).
pub fn record_navigation(outcome: &'static str) {
    metrics::counter!("router_navigations_total", "outcome" => outcome).increment(1);
}

/// Record the result of one lazy module fetch (`ready`, `failed`).
pub fn record_module_load(result: &'static str) {
    metrics::counter!("router_module_loads_total", "result" => result).increment(1);
}

pub fn set_routes_registered(count: usize) {
    metrics::gauge!("router_routes_registered").set(count as f64);
}
