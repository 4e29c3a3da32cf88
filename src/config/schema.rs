//! Configuration schema definitions.
//!
//! This module defines the route file format and the tunables of the
//! loader, history and navigation subsystems. All types derive Serde traits
//! for deserialization from TOML.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Route definitions, in registration order.
    pub routes: Vec<RouteConfig>,

    /// Lazy module loading settings.
    pub loader: LoaderConfig,

    /// Navigation history settings.
    pub history: HistoryConfig,

    /// Navigation pipeline settings.
    pub navigation: NavigationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A route as written in the route file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// Path pattern (`/patient/:id`), relative for children.
    pub path: String,

    /// Unique route name for named navigation.
    #[serde(default)]
    pub name: Option<String>,

    /// Component key, resolved against the host's view registry.
    pub view: String,

    /// Load the component on first navigation instead of at startup.
    #[serde(default)]
    pub lazy: bool,

    /// Pass route parameters to the component as props.
    #[serde(default)]
    pub props: bool,

    /// Arbitrary route metadata.
    #[serde(default)]
    pub meta: HashMap<String, String>,

    /// Nested routes.
    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

/// Lazy module loading configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Per-attempt load timeout in milliseconds (0 disables the timeout).
    pub timeout_ms: u64,

    /// Extra attempts after a failed load before the failure is surfaced.
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts, in milliseconds.
    pub backoff_base_ms: u64,

    /// Maximum backoff delay in milliseconds.
    pub backoff_max_ms: u64,
}

impl LoaderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_attempts: 0,
            backoff_base_ms: 100,
            backoff_max_ms: 2_000,
        }
    }
}

/// Navigation history configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained entries; the oldest are dropped beyond it.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 100 }
    }
}

/// Navigation pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Maximum chained guard redirects per navigation.
    pub max_redirects: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { max_redirects: 10 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert!(config.routes.is_empty());
        assert_eq!(config.loader.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(config.navigation.max_redirects, 10);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_route_file() {
        let config: RouterConfig = toml::from_str(
            r#"
            [loader]
            timeout_ms = 0
            retry_attempts = 2

            [[routes]]
            path = "/"
            name = "login"
            view = "LoginPage"

            [[routes]]
            path = "/patient/:id"
            name = "PatientPage"
            view = "PatientPage"
            props = true
            meta = { title = "Patient" }

            [[routes.children]]
            path = "3d-view"
            view = "Patient3D"
            lazy = true
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.loader.timeout(), None);
        assert_eq!(config.loader.retry_attempts, 2);
        assert_eq!(config.loader.backoff_base_ms, 100);

        let patient = &config.routes[1];
        assert!(patient.props);
        assert_eq!(patient.meta.get("title").map(String::as_str), Some("Patient"));
        assert_eq!(patient.children.len(), 1);
        assert!(patient.children[0].lazy);
        assert_eq!(patient.children[0].name, None);
    }
}
