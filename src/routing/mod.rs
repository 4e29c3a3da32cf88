//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup or reload):
//!     RouteDescriptor[] (nested)
//!     → table.rs (flatten children, prefix patterns)
//!     → pattern.rs (compile into Literal / Param / CatchAll segments)
//!     → Freeze as RouteTable, shared via Arc
//!
//! Resolution:
//!     raw location ("/patient/42?tab=ecg")
//!     → path.rs (split query/hash, normalize)
//!     → matcher.rs (scan in registration order)
//!     → Return: ResolvedRoute or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable while shared
//! - No regex: segment-by-segment comparison only
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod path;
pub mod pattern;
pub mod route;
pub mod table;

pub use matcher::Matcher;
pub use pattern::{compile, CompiledPattern, Segment};
pub use route::{CompiledRoute, PropsMode, ResolvedRoute, RouteDescriptor, RouteId};
pub use table::RouteTable;
