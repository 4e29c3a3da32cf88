//! View handles and references.
//!
//! A route points at its view through a [`ViewRef`]: either a handle that is
//! already materialized, or a [`LazyView`] whose loader produces one on first
//! use. The rendering layer owns what a view actually is; this crate only
//! tracks identity.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::LoadError;

/// Future returned by a lazy view loader.
pub type LoadFuture = BoxFuture<'static, Result<ViewHandle, LoadError>>;

/// Loader function of a lazy view. Called once per fetch attempt.
pub type LoaderFn = Arc<dyn Fn() -> LoadFuture + Send + Sync>;

#[derive(Debug)]
struct ViewComponent {
    name: String,
}

/// Handle to a materialized view component.
///
/// Clones share identity: two handles are equal only if they come from the
/// same materialization.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    component: Arc<ViewComponent>,
}

impl ViewHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            component: Arc::new(ViewComponent { name: name.into() }),
        }
    }

    /// Component name, as registered by the host application.
    pub fn name(&self) -> &str {
        &self.component.name
    }
}

impl PartialEq for ViewHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.component, &other.component)
    }
}

impl Eq for ViewHandle {}

/// A view materialized on demand by an async loader.
#[derive(Clone)]
pub struct LazyView {
    key: Arc<str>,
    loader: LoaderFn,
}

impl LazyView {
    /// Create a lazy view. `key` identifies the module: every route using the
    /// same key shares one cache entry in the [`ModuleLoader`](crate::loader::ModuleLoader).
    pub fn new<F, Fut>(key: impl Into<Arc<str>>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewHandle, LoadError>> + Send + 'static,
    {
        Self {
            key: key.into(),
            loader: Arc::new(move || Box::pin(loader()) as LoadFuture),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn shared_key(&self) -> Arc<str> {
        self.key.clone()
    }

    /// Start one fetch attempt.
    pub(crate) fn fetch(&self) -> LoadFuture {
        (self.loader)()
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView").field("key", &self.key).finish()
    }
}

/// How a route reaches its view.
#[derive(Debug, Clone)]
pub enum ViewRef {
    /// Already available.
    Eager(ViewHandle),
    /// Loaded on first navigation.
    Lazy(LazyView),
}

impl ViewRef {
    /// Eager reference to a freshly created handle named `name`.
    pub fn eager(name: impl Into<String>) -> Self {
        ViewRef::Eager(ViewHandle::new(name))
    }

    pub fn lazy<F, Fut>(key: impl Into<Arc<str>>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewHandle, LoadError>> + Send + 'static,
    {
        ViewRef::Lazy(LazyView::new(key, loader))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, ViewRef::Lazy(_))
    }

    /// Name of the eager component, or key of the lazy module.
    pub fn label(&self) -> &str {
        match self {
            ViewRef::Eager(handle) => handle.name(),
            ViewRef::Lazy(lazy) => lazy.key(),
        }
    }
}

impl From<ViewHandle> for ViewRef {
    fn from(handle: ViewHandle) -> Self {
        ViewRef::Eager(handle)
    }
}

impl From<LazyView> for ViewRef {
    fn from(lazy: LazyView) -> Self {
        ViewRef::Lazy(lazy)
    }
}

/// Views supplied by the host application, keyed by the component names used
/// in route configuration files.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    components: HashMap<String, ViewHandle>,
    loaders: HashMap<String, LazyView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already materialized component.
    #[must_use]
    pub fn with_component(mut self, key: impl Into<String>, handle: ViewHandle) -> Self {
        self.components.insert(key.into(), handle);
        self
    }

    /// Register a loader for a component.
    #[must_use]
    pub fn with_loader(mut self, key: impl Into<String>, lazy: LazyView) -> Self {
        self.loaders.insert(key.into(), lazy);
        self
    }

    /// Resolve a component key. `lazy` states the route's preference: a lazy
    /// route uses the loader when one exists, an eager route the materialized
    /// component; either falls back to the other.
    pub fn resolve(&self, key: &str, lazy: bool) -> Option<ViewRef> {
        let eager = || self.components.get(key).cloned().map(ViewRef::Eager);
        let deferred = || self.loaders.get(key).cloned().map(ViewRef::Lazy);
        if lazy {
            deferred().or_else(eager)
        } else {
            eager().or_else(deferred)
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key) || self.loaders.contains_key(key)
    }
}
