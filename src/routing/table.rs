//! Route storage.
//!
//! # Responsibilities
//! - Flatten nested descriptors into prefixed compiled routes
//! - Enforce globally unique route names
//! - Expose routes in registration order for matching
//! - O(1) lookup by name and by id
//!
//! # Design Decisions
//! - Append-only: registration never reorders existing routes
//! - A failed registration leaves the table untouched, children included
//! - An empty-path child keeps its registration slot; the parent points at it
//!   through `default_child` so path matching descends into it
//! - Reordering requires building a new table and swapping it in wholesale

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{RouterError, RouterResult};
use crate::observability::metrics;
use crate::routing::pattern::compile;
use crate::routing::route::{CompiledRoute, RouteDescriptor, RouteId};

/// Compiled routes in registration order, indexed by name.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<CompiledRoute>>,
    by_name: HashMap<String, RouteId>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an ordered descriptor list, failing on the first
    /// rejected descriptor.
    pub fn build(descriptors: impl IntoIterator<Item = RouteDescriptor>) -> RouterResult<Self> {
        let mut table = Self::new();
        for descriptor in descriptors {
            table.register(descriptor)?;
        }
        tracing::debug!(routes = table.len(), "Route table built");
        Ok(table)
    }

    /// Compile and append a descriptor and its children (depth-first, parent
    /// before children). Returns the id of the top-level route.
    pub fn register(&mut self, descriptor: RouteDescriptor) -> RouterResult<RouteId> {
        let mut staged = Vec::new();
        let mut staged_names = HashSet::new();
        self.stage(&descriptor, None, &mut staged, &mut staged_names)?;

        let first = RouteId(self.routes.len());
        for route in staged {
            if let Some(name) = &route.name {
                self.by_name.insert(name.clone(), route.id);
            }
            tracing::debug!(
                id = route.id.0,
                pattern = %route.pattern.source(),
                name = ?route.name,
                lazy = route.view.is_lazy(),
                "Route registered"
            );
            self.routes.push(Arc::new(route));
        }

        metrics::set_routes_registered(self.routes.len());
        Ok(first)
    }

    fn stage(
        &self,
        descriptor: &RouteDescriptor,
        parent: Option<(RouteId, &str)>,
        staged: &mut Vec<CompiledRoute>,
        staged_names: &mut HashSet<String>,
    ) -> RouterResult<()> {
        let full_path = join_paths(parent.map(|(_, prefix)| prefix), &descriptor.path);
        let pattern = compile(&full_path)?;

        if let Some(name) = &descriptor.name {
            if self.by_name.contains_key(name) || !staged_names.insert(name.clone()) {
                return Err(RouterError::DuplicateName(name.clone()));
            }
        }

        let id = RouteId(self.routes.len() + staged.len());
        let slot = staged.len();
        let prefix = pattern.source().to_string();
        staged.push(CompiledRoute {
            id,
            pattern,
            name: descriptor.name.clone(),
            view: descriptor.view.clone(),
            props: descriptor.props,
            meta: descriptor.meta.clone(),
            parent: parent.map(|(parent_id, _)| parent_id),
            default_child: None,
        });

        for child in &descriptor.children {
            let child_slot = staged.len();
            self.stage(child, Some((id, &prefix)), staged, staged_names)?;

            if staged[slot].default_child.is_none()
                && staged[child_slot].pattern == staged[slot].pattern
            {
                let child_id = staged[child_slot].id;
                staged[slot].default_child = Some(child_id);
            }
        }
        Ok(())
    }

    /// Route registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<CompiledRoute>> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: RouteId) -> Option<&Arc<CompiledRoute>> {
        self.routes.get(id.0)
    }

    /// All routes in registration order.
    pub fn all(&self) -> &[Arc<CompiledRoute>] {
        &self.routes
    }

    /// Follow `default_child` links down from `route`. A route without an
    /// empty-path child is its own leaf.
    pub fn default_leaf<'t>(&'t self, route: &'t Arc<CompiledRoute>) -> &'t Arc<CompiledRoute> {
        let mut leaf = route;
        while let Some(child) = leaf.default_child.and_then(|id| self.get(id)) {
            leaf = child;
        }
        leaf
    }

    /// Ancestor-to-leaf chain ending at `id`.
    pub fn lineage(&self, id: RouteId) -> Vec<RouteId> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            chain.push(current);
            next = self.get(current).and_then(|route| route.parent);
        }
        chain.reverse();
        chain
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Prefix a child path with its parent's pattern. Absolute child paths stand
/// alone; an empty child path shares the parent's.
pub(crate) fn join_paths(parent: Option<&str>, child: &str) -> String {
    match parent {
        None => child.to_string(),
        Some(_) if child.starts_with('/') => child.to_string(),
        Some(parent) if child.is_empty() => parent.to_string(),
        Some(parent) => format!("{}/{}", parent.trim_end_matches('/'), child),
    }
}
