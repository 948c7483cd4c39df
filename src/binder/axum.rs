//! Axum bindings: the built-in binder and branch router.
//!
//! # Responsibilities
//! - Register `prefix + path` with a method filter on an `axum::Router`
//! - Group a configured root's routes in a per-branch router, nested
//!   under the branch prefix once the branch has settled
//!
//! # Design Decisions
//! - The assembled `Router` sits behind a `Mutex<Option<_>>`: Axum
//!   routers are by-value builders, and binder calls interleave across
//!   concurrently walked siblings
//! - `all` maps to `any`; `connect` has no Axum equivalent and is
//!   skipped with a warning
//! - A `(method, mount)` pair registers once; a second registration is
//!   a load error carrying both halves of the pair

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{any, on, MethodFilter};
use axum::Router;

use crate::binder::{Adapter, Binder, BranchRouter, RouterFactory};
use crate::error::LoadError;
use crate::routing::resolver;
use crate::routing::route::Route;
use crate::routing::walker::Branch;

/// Binder that assembles an `axum::Router` from discovered routes.
pub struct AxumBinder {
    router: Mutex<Option<Router>>,
    registered: Mutex<HashSet<(String, String)>>,
}

impl AxumBinder {
    pub fn new() -> Self {
        Self {
            router: Mutex::new(Some(Router::new())),
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Take the assembled router out of the binder.
    pub fn take_router(&self) -> Router {
        lock(&self.router).take().unwrap_or_default()
    }

    fn register(&self, route: &Route) -> Result<(), LoadError> {
        let path = scalar_path(route)?;
        let mount = mount_path(&route.prefix, path);

        if let Some(method) = route.method.as_deref() {
            let mut registered = lock(&self.registered);
            if !registered.insert((method.to_string(), mount.clone())) {
                return Err(LoadError::DuplicateRoute {
                    method: method.to_string(),
                    mount,
                });
            }
        }

        let mut guard = lock(&self.router);
        let router = guard.take().unwrap_or_default();
        *guard = Some(add_route(router, route, &mount)?);
        Ok(())
    }
}

impl Default for AxumBinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Binder for AxumBinder {
    async fn bind(
        &self,
        route: &Arc<Route>,
        adapter: Option<Arc<dyn Adapter>>,
        router: Option<Arc<dyn BranchRouter>>,
    ) -> Result<(), LoadError> {
        if let Some(adapter) = adapter {
            return adapter.handle(route).await;
        }
        if let Some(router) = router {
            return router.handle(route).await;
        }
        self.register(route)
    }
}

/// Factory producing one nested router per configured root.
///
/// Each branch accumulates its routes in an inner router; when the
/// branch's walk settles, the inner router is nested under the branch
/// prefix (or merged, for an empty prefix) into the factory's target.
pub struct AxumRouterFactory {
    target: Arc<Mutex<Option<Router>>>,
}

impl AxumRouterFactory {
    pub fn new() -> Self {
        Self {
            target: Arc::new(Mutex::new(Some(Router::new()))),
        }
    }

    /// Take the combined router holding every finished branch.
    pub fn take_router(&self) -> Router {
        lock(&self.target).take().unwrap_or_default()
    }
}

impl Default for AxumRouterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterFactory for AxumRouterFactory {
    fn create(&self, branch: &Branch) -> Result<Arc<dyn BranchRouter>, LoadError> {
        Ok(Arc::new(AxumBranchRouter {
            prefix: resolver::normalize_prefix(&branch.prefix),
            inner: Mutex::new(Some(Router::new())),
            target: self.target.clone(),
        }))
    }
}

struct AxumBranchRouter {
    prefix: String,
    inner: Mutex<Option<Router>>,
    target: Arc<Mutex<Option<Router>>>,
}

#[async_trait]
impl BranchRouter for AxumBranchRouter {
    async fn handle(&self, route: &Arc<Route>) -> Result<(), LoadError> {
        let path = scalar_path(route)?;
        let mount = mount_path("", path);

        let mut guard = lock(&self.inner);
        let router = guard.take().unwrap_or_default();
        *guard = Some(add_route(router, route, &mount)?);
        Ok(())
    }

    async fn finish(&self) -> Result<(), LoadError> {
        let inner = lock(&self.inner).take().unwrap_or_default();

        let mut guard = lock(&self.target);
        let target = guard.take().unwrap_or_default();
        *guard = Some(if self.prefix.is_empty() {
            target.merge(inner)
        } else {
            target.nest(&self.prefix, inner)
        });
        Ok(())
    }
}

/// Mount point of a route. An absolute resolved path (a verbatim `url`
/// override) is used as-is; anything else hangs off the prefix.
fn mount_path(prefix: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Add one method route to `router` at `mount`.
fn add_route(router: Router, route: &Route, mount: &str) -> Result<Router, LoadError> {
    let Some(method) = route.method.as_deref() else {
        return Ok(router);
    };
    let Some(handler) = route.handler.clone() else {
        return Err(LoadError::InvalidHandler {
            filepath: route.filepath.clone(),
        });
    };

    let call = move |request: Request<Body>| {
        let handler = handler.clone();
        async move { handler.execute(request).await }
    };

    tracing::debug!(method, mount, "registering route");

    Ok(match method {
        "all" => router.route(mount, any(call)),
        method => match method_filter(method) {
            Some(filter) => router.route(mount, on(filter, call)),
            None => {
                tracing::warn!(method, mount, "method has no axum equivalent, skipping");
                router
            }
        },
    })
}

fn scalar_path(route: &Route) -> Result<&str, LoadError> {
    route
        .path
        .as_single()
        .ok_or_else(|| LoadError::AmbiguousPath {
            filepath: route.filepath.clone(),
        })
}

fn method_filter(method: &str) -> Option<MethodFilter> {
    match method {
        "delete" => Some(MethodFilter::DELETE),
        "get" => Some(MethodFilter::GET),
        "head" => Some(MethodFilter::HEAD),
        "options" => Some(MethodFilter::OPTIONS),
        "patch" => Some(MethodFilter::PATCH),
        "post" => Some(MethodFilter::POST),
        "put" => Some(MethodFilter::PUT),
        "trace" => Some(MethodFilter::TRACE),
        _ => None,
    }
}
