//! Router facade.
//!
//! Ties the route table, the module loader and the navigation controller
//! together behind one cloneable handle, and owns hot reload of the table.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::config::{
    build_descriptors, ConfigError, HistoryConfig, LoaderConfig, NavigationConfig, RouterConfig,
};
use crate::error::RouterResult;
use crate::lifecycle::StopReason;
use crate::loader::{ModuleLoader, ViewRegistry};
use crate::navigation::{
    ActiveView, NavigationController, NavigationGuard, NavigationOutcome, NavigationRecord,
    NavigationTarget, ViewSubscription,
};
use crate::routing::{Matcher, ResolvedRoute, RouteDescriptor, RouteTable};

/// Cloneable handle to a running router. Clones share all state.
#[derive(Clone)]
pub struct Router {
    table: Arc<ArcSwap<RouteTable>>,
    controller: Arc<NavigationController>,
    registry: Arc<ViewRegistry>,
}

/// Builder for [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<RouteDescriptor>,
    guards: Vec<Arc<dyn NavigationGuard>>,
    registry: ViewRegistry,
    loader: LoaderConfig,
    history: HistoryConfig,
    navigation: NavigationConfig,
}

impl RouterBuilder {
    #[must_use]
    pub fn route(mut self, descriptor: RouteDescriptor) -> Self {
        self.routes.push(descriptor);
        self
    }

    #[must_use]
    pub fn routes(mut self, descriptors: impl IntoIterator<Item = RouteDescriptor>) -> Self {
        self.routes.extend(descriptors);
        self
    }

    #[must_use]
    pub fn guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Views used to resolve component keys when reloading from config.
    #[must_use]
    pub fn registry(mut self, registry: ViewRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader = config;
        self
    }

    #[must_use]
    pub fn history_config(mut self, config: HistoryConfig) -> Self {
        self.history = config;
        self
    }

    #[must_use]
    pub fn navigation_config(mut self, config: NavigationConfig) -> Self {
        self.navigation = config;
        self
    }

    /// Compile the routes and start the router.
    pub fn build(self) -> RouterResult<Router> {
        let table = Arc::new(ArcSwap::from_pointee(RouteTable::build(self.routes)?));

        let mut controller = NavigationController::new(
            table.clone(),
            ModuleLoader::new(self.loader),
            self.navigation,
            &self.history,
        );
        for guard in self.guards {
            controller.add_guard(guard);
        }

        tracing::info!(routes = table.load().len(), "Router ready");
        Ok(Router {
            table,
            controller: Arc::new(controller),
            registry: Arc::new(self.registry),
        })
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Build a router from a validated configuration, resolving view keys
    /// against `registry`.
    pub fn from_config(config: &RouterConfig, registry: ViewRegistry) -> Result<Self, ConfigError> {
        let routes = build_descriptors(&config.routes, &registry)?;
        let router = Self::builder()
            .routes(routes)
            .registry(registry)
            .loader_config(config.loader.clone())
            .history_config(config.history.clone())
            .navigation_config(config.navigation.clone())
            .build()?;
        Ok(router)
    }

    /// Resolve a location against the current table without navigating.
    pub fn resolve(&self, path: &str) -> RouterResult<ResolvedRoute> {
        let table = self.table.load();
        Matcher::new(&table).resolve(path)
    }

    pub fn resolve_named(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> RouterResult<ResolvedRoute> {
        let table = self.table.load();
        Matcher::new(&table).resolve_named(name, params)
    }

    /// Concrete, URL-encoded path of a named route.
    pub fn href(&self, name: &str, params: &HashMap<String, String>) -> RouterResult<String> {
        let table = self.table.load();
        Matcher::new(&table).href(name, params)
    }

    pub async fn navigate(&self, target: impl Into<NavigationTarget>) -> NavigationOutcome {
        self.controller.navigate(target).await
    }

    pub async fn replace(&self, target: impl Into<NavigationTarget>) -> NavigationOutcome {
        self.controller.replace(target).await
    }

    pub async fn go(&self, delta: isize) -> NavigationOutcome {
        self.controller.go(delta).await
    }

    pub async fn back(&self) -> NavigationOutcome {
        self.controller.back().await
    }

    pub async fn forward(&self) -> NavigationOutcome {
        self.controller.forward().await
    }

    pub fn current(&self) -> Option<Arc<ResolvedRoute>> {
        self.controller.current()
    }

    pub fn active(&self) -> Option<Arc<ActiveView>> {
        self.controller.active()
    }

    pub fn history(&self) -> NavigationRecord {
        self.controller.history()
    }

    pub fn subscribe(&self) -> ViewSubscription {
        self.controller.subscribe()
    }

    /// Snapshot of the current route table.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    pub fn loader(&self) -> &ModuleLoader {
        self.controller.loader()
    }

    /// Replace the whole route table. On error the current table stays.
    ///
    /// Navigations already past matching finish against the table they
    /// started with; the current route is kept as is.
    pub fn reload(&self, descriptors: Vec<RouteDescriptor>) -> RouterResult<usize> {
        let table = RouteTable::build(descriptors)?;
        let count = table.len();
        self.table.store(Arc::new(table));
        tracing::info!(routes = count, "Route table swapped");
        Ok(count)
    }

    /// Rebuild the table from a reloaded configuration. Loader, history and
    /// navigation settings are fixed at startup and not re-applied.
    pub fn reload_config(&self, config: &RouterConfig) -> Result<usize, ConfigError> {
        let descriptors = build_descriptors(&config.routes, &self.registry)?;
        Ok(self.reload(descriptors)?)
    }

    /// Apply configurations from `updates` until shutdown is signalled or
    /// the sender goes away.
    pub async fn apply_updates(
        &self,
        mut updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<StopReason>,
    ) {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(config) => {
                        if let Err(e) = self.reload_config(&config) {
                            tracing::error!(error = %e, "Rejected reloaded routes, keeping current table");
                        }
                    }
                    None => {
                        tracing::info!("Route updates closed, exiting reloader");
                        break;
                    }
                },
                reason = shutdown.recv() => {
                    let reason = reason.map_or("closed", |r| r.as_str());
                    tracing::info!(reason, "Route reloader stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use crate::loader::{ViewHandle, ViewRef};

    fn router() -> Router {
        Router::builder()
            .route(RouteDescriptor::new("/", ViewRef::eager("LoginPage")).named("login"))
            .route(RouteDescriptor::new("/user", ViewRef::eager("UserPage")).named("UserPage"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_reload_keeps_current_route() {
        let router = router();
        router.navigate("/user").await;

        let count = router
            .reload(vec![
                RouteDescriptor::new("/admin", ViewRef::eager("AdminPage")).named("AdminPage"),
            ])
            .unwrap();
        assert_eq!(count, 1);

        assert_eq!(router.current().unwrap().path, "/user");
        assert!(router.resolve("/admin").is_ok());
        assert_eq!(
            router.resolve("/user").unwrap_err(),
            RouterError::NoMatch("/user".into())
        );
    }

    #[test]
    fn test_failed_reload_keeps_table() {
        let router = router();
        let err = router
            .reload(vec![RouteDescriptor::new("/x/:a/:a", ViewRef::eager("X"))])
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert_eq!(router.table().len(), 2);
    }

    #[test]
    fn test_reload_config() {
        let registry = ViewRegistry::new().with_component("AdminPage", ViewHandle::new("AdminPage"));
        let router = Router::from_config(&RouterConfig::default(), registry).unwrap();
        assert!(router.table().is_empty());

        let config = crate::config::parse_config(
            r#"
            [[routes]]
            path = "/admin"
            name = "AdminPage"
            view = "AdminPage"
            "#,
        )
        .unwrap();
        assert_eq!(router.reload_config(&config).unwrap(), 1);

        let mut unknown = config.clone();
        unknown.routes[0].view = "Missing".into();
        assert!(matches!(
            router.reload_config(&unknown),
            Err(ConfigError::UnknownView { .. })
        ));
        assert_eq!(router.table().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_updates_stops_on_shutdown() {
        let router = router();
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = crate::lifecycle::Shutdown::new();

        let task = tokio::spawn({
            let router = router.clone();
            let shutdown_rx = shutdown.subscribe();
            async move { router.apply_updates(rx, shutdown_rx).await }
        });

        tx.send(RouterConfig::default()).unwrap();
        tokio::task::yield_now().await;
        assert!(shutdown.trigger(StopReason::Signal));
        task.await.unwrap();
        assert_eq!(shutdown.listeners(), 0);
        assert_eq!(shutdown.reason(), Some(StopReason::Signal));
    }
}
