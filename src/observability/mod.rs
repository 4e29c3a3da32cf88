//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (registration, navigation, loads, reloads)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout) in the binary
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (navigation_id, path, route) on every event
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
