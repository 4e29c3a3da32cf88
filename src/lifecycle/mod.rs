//! Process lifecycle for the `spa-router` binary.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT / SIGTERM → Shutdown::trigger(StopReason::Signal)
//!
//! Shutdown (shutdown.rs):
//!     first trigger → StopReason broadcast → route reloader leaves its loop
//!     later triggers → ignored
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, StopReason};
pub use signals::wait_for_signal;
