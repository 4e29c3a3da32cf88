//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::error::RouterError;
use crate::loader::ViewRegistry;
use crate::routing::{PropsMode, RouteDescriptor};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route '{path}' references unknown view '{view}'")]
    UnknownView { path: String, view: String },

    #[error("Route table rejected: {0}")]
    Route(#[from] RouterError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Turn configured routes into descriptors, resolving component keys
/// against the host's view registry.
pub fn build_descriptors(
    routes: &[RouteConfig],
    registry: &ViewRegistry,
) -> Result<Vec<RouteDescriptor>, ConfigError> {
    routes
        .iter()
        .map(|route| build_descriptor(route, registry))
        .collect()
}

fn build_descriptor(
    route: &RouteConfig,
    registry: &ViewRegistry,
) -> Result<RouteDescriptor, ConfigError> {
    let view = registry
        .resolve(&route.view, route.lazy)
        .ok_or_else(|| ConfigError::UnknownView {
            path: route.path.clone(),
            view: route.view.clone(),
        })?;

    Ok(RouteDescriptor {
        path: route.path.clone(),
        name: route.name.clone(),
        view,
        props: if route.props {
            PropsMode::ParamsAsProps
        } else {
            PropsMode::None
        },
        meta: route.meta.clone(),
        children: build_descriptors(&route.children, registry)?,
    })
}
