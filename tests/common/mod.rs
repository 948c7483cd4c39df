//! Shared fixtures for route discovery integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use autoroute::{
    handler_fn, Adapter, Binder, Branch, BranchRouter, Config, Endpoint, Handler, LoadError,
    RegistryLoader, Route, RouterFactory, Settings,
};

/// A temporary route tree plus the registry backing its module files.
pub struct Fixture {
    pub dir: TempDir,
    pub loader: RegistryLoader,
}

/// Install a test subscriber so `RUST_LOG` surfaces walker output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: TempDir::new().unwrap(),
            loader: RegistryLoader::new("js"),
        }
    }

    /// Create a real directory under the tree root.
    pub fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.dir.path().join(rel)).unwrap();
    }

    /// Create a real (empty) module file and register its endpoint.
    pub fn module(&mut self, rel: &str, endpoint: Endpoint) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"").unwrap();
        self.loader.register(path, endpoint);
    }

    /// Create a file the registry does not know about.
    pub fn stray_file(&self, rel: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"").unwrap();
    }

    pub fn into_settings(self, config: Config) -> (Settings, TempDir) {
        let Fixture { dir, loader } = self;
        let settings = Settings::new(config)
            .base_dir(dir.path())
            .module_loader(Arc::new(loader));
        (settings, dir)
    }
}

/// A handler responding 200 with a fixed body.
pub fn ok_handler(tag: &'static str) -> Handler {
    Handler::Single(handler_fn(move |_req| async move {
        axum::response::Response::builder()
            .status(axum::http::StatusCode::OK)
            .body(axum::body::Body::from(tag))
            .unwrap()
    }))
}

pub fn endpoint(tag: &'static str) -> Endpoint {
    Endpoint::Handler(ok_handler(tag))
}

/// Binder recording each `(method, mount)` pair it receives.
#[derive(Default)]
pub struct RecordingBinder {
    pub bound: Mutex<Vec<(String, String)>>,
}

impl RecordingBinder {
    pub fn mounts(&self) -> Vec<(String, String)> {
        let mut bound = self.bound.lock().unwrap().clone();
        bound.sort();
        bound
    }
}

#[async_trait]
impl Binder for RecordingBinder {
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

        let method = route.method.clone().unwrap_or_default();
        let path = route.path.as_single().unwrap_or("<set>");
        let mount = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{}/{}", route.prefix, path)
        };
        self.bound.lock().unwrap().push((method, mount));
        Ok(())
    }
}

/// Adapter counting its hook invocations.
#[derive(Default)]
pub struct CountingAdapter {
    pub before: AtomicUsize,
    pub handled: AtomicUsize,
    pub after: AtomicUsize,
}

#[async_trait]
impl Adapter for CountingAdapter {
    async fn before(&self, _config: &Config) -> Result<(), LoadError> {
        self.before.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn handle(&self, _route: &Arc<Route>) -> Result<(), LoadError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn after(&self, _config: &Config) -> Result<(), LoadError> {
        self.after.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Router factory recording creations, per-route handling and finishes.
#[derive(Default)]
pub struct SpyRouterFactory {
    pub created_prefixes: Mutex<Vec<String>>,
    pub handled: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
}

impl RouterFactory for SpyRouterFactory {
    fn create(&self, branch: &Branch) -> Result<Arc<dyn BranchRouter>, LoadError> {
        self.created_prefixes
            .lock()
            .unwrap()
            .push(branch.prefix.clone());
        Ok(Arc::new(SpyBranchRouter {
            handled: self.handled.clone(),
            finished: self.finished.clone(),
        }))
    }
}

struct SpyBranchRouter {
    handled: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

#[async_trait]
impl BranchRouter for SpyBranchRouter {
    async fn handle(&self, _route: &Arc<Route>) -> Result<(), LoadError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn finish(&self) -> Result<(), LoadError> {
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
