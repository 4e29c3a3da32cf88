//! Route descriptors, compiled routes and resolution results.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::loader::ViewRef;
use crate::routing::pattern::CompiledPattern;

/// Position of a compiled route in its table (registration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteId(pub usize);

/// Whether the rendering layer receives route parameters as props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropsMode {
    #[default]
    None,
    ParamsAsProps,
}

/// A route as supplied by the host application.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// Path pattern. Relative for children (`3d-view`), absolute otherwise.
    pub path: String,
    /// Globally unique name for named navigation.
    pub name: Option<String>,
    pub view: ViewRef,
    pub props: PropsMode,
    /// Arbitrary metadata (titles, permissions, ...), surfaced on resolution.
    pub meta: HashMap<String, String>,
    /// Nested routes, prefixed with this route's path at registration.
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>, view: impl Into<ViewRef>) -> Self {
        Self {
            path: path.into(),
            name: None,
            view: view.into(),
            props: PropsMode::None,
            meta: HashMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Pass route parameters to the view as props.
    #[must_use]
    pub fn params_as_props(mut self) -> Self {
        self.props = PropsMode::ParamsAsProps;
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }
}

/// A flattened, compiled route owned by a [`RouteTable`](crate::routing::RouteTable).
#[derive(Debug)]
pub struct CompiledRoute {
    pub id: RouteId,
    pub pattern: CompiledPattern,
    pub name: Option<String>,
    pub view: ViewRef,
    pub props: PropsMode,
    pub meta: HashMap<String, String>,
    /// Enclosing route, for children.
    pub parent: Option<RouteId>,
    /// First child registered with an empty path. Shares this route's pattern
    /// and is what a path match on this route lands on.
    pub default_child: Option<RouteId>,
}

impl CompiledRoute {
    /// Name if present, pattern otherwise. Used in logs and errors.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.pattern.source())
    }
}

/// The outcome of resolving a location against a route table.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// The matched route.
    pub route: Arc<CompiledRoute>,
    /// Decoded path parameters.
    pub params: HashMap<String, String>,
    /// Normalized path, without query or hash.
    pub path: String,
    /// Normalized path followed by the original query and hash.
    pub full_path: String,
    pub query: HashMap<String, String>,
    pub hash: Option<String>,
    /// Ancestor-to-leaf chain of the matched route.
    pub matched: Vec<RouteId>,
}

impl ResolvedRoute {
    pub fn name(&self) -> Option<&str> {
        self.route.name.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Props handed to the view: the parameters for `ParamsAsProps` routes,
    /// nothing otherwise.
    pub fn props(&self) -> Option<HashMap<String, String>> {
        match self.route.props {
            PropsMode::ParamsAsProps => Some(self.params.clone()),
            PropsMode::None => None,
        }
    }
}

impl PartialEq for ResolvedRoute {
    fn eq(&self, other: &Self) -> bool {
        self.route.id == other.route.id
            && self.route.pattern == other.route.pattern
            && self.params == other.params
            && self.full_path == other.full_path
            && self.query == other.query
            && self.hash == other.hash
            && self.matched == other.matched
    }
}
