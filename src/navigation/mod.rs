//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! navigate(target)
//!     → MATCHING    Matcher::resolve / resolve_named   ─ error ─▶ FAILED
//!     → GUARDING    guards in order                    ─ cancel ▶ CANCELLED
//!                                                      ─ redirect ▶ navigate(new target)
//!     → LOADING     ModuleLoader::load                 ─ error ─▶ FAILED
//!     → COMMITTING  current route + history + publish  ─ newer navigation ▶ CANCELLED
//!     → COMMITTED
//! ```
//!
//! Suspension happens only inside guards and module loads; a navigation
//! re-checks whether it is still the latest after each of them.

pub mod controller;
pub mod guard;
pub mod history;
pub mod state;

pub use controller::{NavigationController, ViewSubscription};
pub use guard::{guard_fn, FnGuard, GuardDecision, NavigationGuard};
pub use history::NavigationRecord;
pub use state::{ActiveView, CancelReason, NavigationOutcome, NavigationState, NavigationTarget};
