//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize an incoming location (strip query/hash, collapse slashes)
//! - Scan the table in registration order, first match wins
//! - Extract URL-decoded parameters
//! - Resolve named targets by substituting parameters into the pattern
//!
//! # Design Decisions
//! - Literal segments are case-sensitive
//! - Linear scan over a flat table; nesting was flattened at registration
//! - A path match on a route with an empty-path child lands on that child;
//!   named resolution stays on the named route
//! - Explicit `NoMatch` rather than a silent default; a catch-all route
//!   registered last is how callers opt into a fallback

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RouterError, RouterResult};
use crate::routing::path::{normalize_path, parse_query, segments, Location};
use crate::routing::route::{CompiledRoute, ResolvedRoute};
use crate::routing::table::RouteTable;

/// Resolves locations against a borrowed route table.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    table: &'a RouteTable,
}

impl<'a> Matcher<'a> {
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Resolve a raw location (`/patient/42?tab=ecg#top`).
    pub fn resolve(&self, raw: &str) -> RouterResult<ResolvedRoute> {
        let location = Location::parse(raw);
        let path = normalize_path(location.path);
        let parts = segments(&path);

        self.table
            .all()
            .iter()
            .find_map(|route| {
                route
                    .pattern
                    .match_segments(&parts)
                    .map(|params| (route, params))
            })
            .map(|(route, params)| {
                let leaf = self.table.default_leaf(route);
                self.resolved(leaf, params, &path, location.query, location.hash)
            })
            .ok_or_else(|| {
                tracing::debug!(path = %path, "No route matched");
                RouterError::NoMatch(path.to_string())
            })
    }

    /// Resolve a named route with the given parameters.
    ///
    /// The named route is the result even when an earlier-registered pattern
    /// would also match the generated path.
    pub fn resolve_named(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> RouterResult<ResolvedRoute> {
        let route = self
            .table
            .lookup_by_name(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;

        let path = route
            .pattern
            .build(params)
            .map_err(|param| RouterError::MissingRequiredParam {
                route: name.to_string(),
                param,
            })?;

        for key in params.keys() {
            if !route.pattern.param_names().any(|known| known == key) {
                tracing::warn!(route = %name, param = %key, "Ignoring parameter unknown to route");
            }
        }

        // re-match so parameters are exactly what a path navigation would see
        let extracted = route
            .pattern
            .match_segments(&segments(&path))
            .ok_or_else(|| RouterError::NoMatch(path.clone()))?;

        Ok(self.resolved(route, extracted, &path, None, None))
    }

    /// Generate the concrete path of a named route.
    pub fn href(&self, name: &str, params: &HashMap<String, String>) -> RouterResult<String> {
        self.resolve_named(name, params).map(|resolved| resolved.full_path)
    }

    fn resolved(
        &self,
        route: &Arc<CompiledRoute>,
        params: HashMap<String, String>,
        path: &str,
        query: Option<&str>,
        hash: Option<&str>,
    ) -> ResolvedRoute {
        let query = query.filter(|q| !q.is_empty());
        let hash = hash.filter(|h| !h.is_empty());

        let mut full_path = path.to_string();
        if let Some(query) = query {
            full_path.push('?');
            full_path.push_str(query);
        }
        if let Some(hash) = hash {
            full_path.push('#');
            full_path.push_str(hash);
        }

        ResolvedRoute {
            route: route.clone(),
            params,
            path: path.to_string(),
            full_path,
            query: query.map(parse_query).unwrap_or_default(),
            hash: hash.map(str::to_string),
            matched: self.table.lineage(route.id),
        }
    }
}
