//! Router error definitions.
//!
//! # Taxonomy
//! - Registration time: `InvalidPattern`, `DuplicateName` (the offending
//!   descriptor is rejected, the table is otherwise unaffected)
//! - Navigation time: `NoMatch`, `UnknownRouteName`, `MissingRequiredParam`,
//!   `ModuleLoadFailed`, `RedirectLimit`, `HistoryOutOfRange` (the navigation
//!   ends FAILED, the current route is unchanged)

use thiserror::Error;

/// Errors produced by route registration, resolution and navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A path pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A route name is already taken by an earlier registration.
    #[error("Duplicate route name '{0}'")]
    DuplicateName(String),

    /// No registered route matches the path.
    #[error("No route matches '{0}'")]
    NoMatch(String),

    /// Named navigation to a name that was never registered.
    #[error("Unknown route name '{0}'")]
    UnknownRouteName(String),

    /// Named navigation without a value for a required parameter.
    #[error("Route '{route}' requires parameter '{param}'")]
    MissingRequiredParam { route: String, param: String },

    /// A lazy view module failed to load.
    #[error("Failed to load module '{module}': {reason}")]
    ModuleLoadFailed { module: String, reason: String },

    /// Guards kept redirecting past the configured limit.
    #[error("Redirect limit of {0} exceeded")]
    RedirectLimit(usize),

    /// History traversal outside the recorded entries.
    #[error("History offset {0} is out of range")]
    HistoryOutOfRange(isize),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Failure reported by a lazy view loader.
///
/// Cloneable so a single failed fetch can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The loader itself reported an error.
    #[error("{0}")]
    Failed(String),

    /// The loader did not finish within the configured timeout.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// The fetch task ended without producing a result.
    #[error("loader task aborted")]
    Aborted,
}

impl LoadError {
    /// Convenience constructor for loader implementations.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}
