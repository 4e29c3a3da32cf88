//! On-demand view loading.
//!
//! # Data Flow
//! ```text
//! ViewRef::Eager(handle) ──────────────────────────────▶ handle
//!
//! ViewRef::Lazy(lazy)
//!     → cache.rs: Ready?        → cached handle
//!                 InFlight?     → wait on the shared outcome
//!                 NotStarted?   → mark InFlight, spawn fetch task
//!     → retry.rs: loader() with timeout, backoff between attempts
//!     → cache.rs: Ready(handle) | Failed(error) → reset → NotStarted
//! ```

pub mod cache;
pub mod retry;
pub mod view;

pub use cache::{LoadStatus, ModuleLoader};
pub use retry::backoff_delay;
pub use view::{LazyView, LoadFuture, LoaderFn, ViewHandle, ViewRef, ViewRegistry};
