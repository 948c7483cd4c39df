//! Filesystem-driven route discovery for Axum services.
//!
//! Derives a routing table from a directory tree: directories become URL
//! path segments, files declare HTTP methods, and loaded modules can
//! override either through descriptors.
//!
//! # Data Flow
//! ```text
//! Config (file or programmatic)
//!     → validation (fail fast, before any I/O)
//!     → per configured root, concurrently:
//!         branch module (prefix / endpoint-map / handler overrides)
//!         → recursive walk (routing::walker)
//!         → method routes → binder dispatch
//!         → branch router finish (nested mount)
//!     → flat Vec<Arc<Route>> in listing order
//! ```
//!
//! # Design Decisions
//! - The engine discovers and binds; it never serves. Request dispatch
//!   belongs to the assembled `axum::Router`
//! - Code-bearing collaborators (module loader, binder, adapter, router
//!   factory) are injected through [`Settings`]; config files select
//!   built-ins by name only
//! - Inject the [`AxumBinder`] or [`AxumRouterFactory`] yourself to take
//!   the assembled router back out after [`load`] returns

pub mod binder;
pub mod config;
pub mod error;
pub mod handler;
pub mod modules;
pub mod routing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future;

use crate::config::schema::PathEntry;
use crate::routing::matcher;
use crate::routing::walker::{self, WalkContext};

pub use binder::{Adapter, AxumBinder, AxumRouterFactory, Binder, BranchRouter, RouterFactory};
pub use config::{Config, EndpointMap, EndpointSpec, Paths};
pub use error::LoadError;
pub use handler::{handler_fn, middleware_fn, Handler, HandlerFn, Step};
pub use modules::manifest::ManifestLoader;
pub use modules::registry::RegistryLoader;
pub use modules::{Descriptor, Endpoint, ModuleLoader, PathDecl};
pub use routing::{Branch, Route, RoutePath};

/// Everything one load call needs: the declarative [`Config`] plus the
/// code-bearing collaborators a config file cannot express.
pub struct Settings {
    pub config: Config,
    /// Directory configured root paths are resolved against.
    pub base_dir: PathBuf,
    pub module_loader: Arc<dyn ModuleLoader>,
    /// Injected binder; takes precedence over `config.loader`.
    pub binder: Option<Arc<dyn Binder>>,
    /// Injected adapter. Adapters can only be injected, never named.
    pub adapter: Option<Arc<dyn Adapter>>,
    /// Injected router factory; takes precedence over `config.router`.
    pub router: Option<Arc<dyn RouterFactory>>,
}

impl Settings {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            module_loader: Arc::new(ManifestLoader::default()),
            binder: None,
            adapter: None,
            router: None,
        }
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.module_loader = loader;
        self
    }

    pub fn binder(mut self, binder: Arc<dyn Binder>) -> Self {
        self.binder = Some(binder);
        self
    }

    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn router(mut self, router: Arc<dyn RouterFactory>) -> Self {
        self.router = Some(router);
        self
    }
}

/// Walk every configured root and return the discovered method routes.
///
/// Each route is handed to the binder as it is discovered; the returned
/// table keeps directory listing order within each root, and roots keep
/// their configured order.
pub async fn load(settings: Settings) -> Result<Vec<Arc<Route>>, LoadError> {
    let Settings {
        config,
        base_dir,
        module_loader,
        binder,
        adapter,
        router,
    } = settings;

    config::validation::validate_config(&config)?;

    let binder = resolve_binder(binder, config.loader.as_deref())?;
    let factory = resolve_router(router, config.router.as_deref())?;
    let adapter = resolve_adapter(adapter, config.adapter.as_deref())?;

    if let Some(adapter) = &adapter {
        adapter.before(&config).await?;
    }

    let entries = config.paths.entries();
    let tasks: Vec<_> = entries
        .iter()
        .map(|entry| {
            load_root(
                entry.clone(),
                &base_dir,
                module_loader.clone(),
                binder.clone(),
                adapter.clone(),
                factory.as_ref(),
                &config.endpoints,
            )
        })
        .collect();

    let collected = future::try_join_all(tasks).await?;
    let mut routes = Vec::new();
    for items in collected {
        routes.extend(items);
    }

    if let Some(adapter) = &adapter {
        adapter.after(&config).await?;
    }

    tracing::info!(
        roots = entries.len(),
        routes = routes.len(),
        "route discovery finished"
    );

    Ok(routes)
}

/// Walk one configured root: merge its branch module into the branch
/// settings, create the branch router, walk, then finish the router.
async fn load_root(
    entry: PathEntry,
    base_dir: &Path,
    loader: Arc<dyn ModuleLoader>,
    binder: Arc<dyn Binder>,
    adapter: Option<Arc<dyn Adapter>>,
    factory: Option<&Arc<dyn RouterFactory>>,
    global: &EndpointMap,
) -> Result<Vec<Arc<Route>>, LoadError> {
    let dir = base_dir.join(&entry.path);

    let mut branch = Branch {
        path: entry.path.clone(),
        prefix: entry.prefix.clone().unwrap_or_default(),
        endpoints: entry.endpoints.clone().unwrap_or_default(),
        handler: None,
    };

    // The root's branch module may fill in whatever the path entry left
    // unset.
    let (module, _) = walker::resolve_branch_module(&loader, &dir).await?;
    match module.as_deref() {
        Some(Endpoint::Handler(handler)) => branch.handler = Some(handler.clone()),
        Some(Endpoint::Descriptor(descriptor)) => {
            if branch.prefix.is_empty() {
                if let Some(prefix) = &descriptor.prefix {
                    branch.prefix = prefix.clone();
                }
            }
            if branch.endpoints.is_empty() {
                if let Some(endpoints) = &descriptor.endpoints {
                    branch.endpoints = endpoints.clone();
                }
            }
            branch.handler = descriptor.handler.clone();
        }
        Some(Endpoint::Alias(alias)) => {
            if branch.prefix.is_empty() {
                branch.prefix = alias.clone();
            }
        }
        None => {}
    }

    let router = match factory {
        Some(factory) => Some(factory.create(&branch)?),
        None => None,
    };

    let matchers = matcher::merge(global, &branch.endpoints);
    let ctx = Arc::new(WalkContext {
        loader,
        binder,
        adapter,
        router: router.clone(),
        endpoints: global.clone(),
        matchers,
        branch,
    });

    let routes = walker::walk_root(ctx, dir).await?;

    if let Some(router) = router {
        router.finish().await?;
    }

    Ok(routes)
}

fn resolve_binder(
    injected: Option<Arc<dyn Binder>>,
    name: Option<&str>,
) -> Result<Arc<dyn Binder>, LoadError> {
    if let Some(binder) = injected {
        return Ok(binder);
    }
    match name.unwrap_or("axum") {
        "axum" => Ok(Arc::new(AxumBinder::new())),
        other => Err(LoadError::UnknownLoader(other.to_string())),
    }
}

fn resolve_router(
    injected: Option<Arc<dyn RouterFactory>>,
    name: Option<&str>,
) -> Result<Option<Arc<dyn RouterFactory>>, LoadError> {
    if let Some(factory) = injected {
        return Ok(Some(factory));
    }
    match name {
        None => Ok(None),
        Some("axum") => Ok(Some(Arc::new(AxumRouterFactory::new()))),
        Some(other) => Err(LoadError::UnknownRouter(other.to_string())),
    }
}

fn resolve_adapter(
    injected: Option<Arc<dyn Adapter>>,
    name: Option<&str>,
) -> Result<Option<Arc<dyn Adapter>>, LoadError> {
    match (injected, name) {
        (Some(adapter), _) => Ok(Some(adapter)),
        (None, Some(name)) => Err(LoadError::UnresolvableAdapter(name.to_string())),
        (None, None) => Ok(None),
    }
}
