//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route pattern, children prefixed by their parents
//! - Detect duplicate route names
//! - Validate value ranges (history size, backoff bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted, at startup and on every reload

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::routing::compile;
use crate::routing::table::join_paths;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("top-level route '{0}' must start with '/'")]
    RelativeTopLevel(String),

    #[error("route '{0}' has an empty view key")]
    EmptyView(String),

    #[error("route '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("route name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("history.max_entries must be at least 1")]
    EmptyHistory,

    #[error("loader.backoff_base_ms ({base}) exceeds loader.backoff_max_ms ({max})")]
    BackoffRange { base: u64, max: u64 },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for route in &config.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativeTopLevel(route.path.clone()));
        }
        validate_route(route, None, &mut names, &mut errors);
    }

    if config.history.max_entries == 0 {
        errors.push(ValidationError::EmptyHistory);
    }
    if config.loader.backoff_base_ms > config.loader.backoff_max_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.loader.backoff_base_ms,
            max: config.loader.backoff_max_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(
    route: &RouteConfig,
    parent: Option<&str>,
    names: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    let full_path = join_paths(parent, &route.path);

    if route.view.trim().is_empty() {
        errors.push(ValidationError::EmptyView(full_path.clone()));
    }

    if let Err(err) = compile(&full_path) {
        errors.push(ValidationError::InvalidPattern {
            path: full_path.clone(),
            reason: err.to_string(),
        });
    }

    if let Some(name) = &route.name {
        if !names.insert(name.clone()) {
            errors.push(ValidationError::DuplicateName(name.clone()));
        }
    }

    for child in &route.children {
        validate_route(child, Some(&full_path), names, errors);
    }
}
