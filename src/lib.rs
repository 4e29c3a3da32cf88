//! Client-side route resolution and navigation core.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                       ROUTER                          │
//!                    │                                                       │
//!   path / name      │  ┌────────────┐    ┌─────────┐    ┌──────────────┐   │
//!   ─────────────────┼─▶│ navigation │───▶│ matcher │───▶│ route table  │   │
//!                    │  │ controller │    └─────────┘    │ (ArcSwap)    │   │
//!                    │  └─────┬──────┘                   └──────▲───────┘   │
//!                    │        │ guards                          │ rebuild   │
//!                    │        ▼                                  │           │
//!                    │  ┌────────────┐                   ┌──────┴───────┐   │
//!                    │  │   module   │                   │    config    │   │
//!                    │  │   loader   │                   │ file watcher │   │
//!                    │  └─────┬──────┘                   └──────────────┘   │
//!                    │        │ commit                                       │
//!   ActiveView       │  ┌─────▼──────┐                                      │
//!   ◀────────────────┼──│ publisher  │  + history record                    │
//!                    │  └────────────┘                                      │
//!                    └──────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod error;
pub mod loader;
pub mod navigation;
pub mod router;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::RouterConfig;
pub use error::{LoadError, RouterError, RouterResult};
pub use loader::{LazyView, ModuleLoader, ViewHandle, ViewRef, ViewRegistry};
pub use navigation::{
    guard_fn, ActiveView, CancelReason, GuardDecision, NavigationGuard, NavigationOutcome,
    NavigationTarget,
};
pub use router::{Router, RouterBuilder};
pub use routing::{Matcher, ResolvedRoute, RouteDescriptor, RouteTable};
