//! The route entity.
//!
//! # Responsibilities
//! - Capture the resolved shape of one tree node: path, optional method,
//!   handler, prefix, and tree linkage
//! - Enforce the handler invariant for method routes at construction
//!
//! # Design Decisions
//! - Routes are created once per walk and immutable thereafter
//! - The parent link is a `Weak` back-reference: a route never owns its
//!   enclosing branch, it only reads the branch's already-computed path
//! - A route with a method always has a scalar path and a valid handler;
//!   a branch root carries path context only

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::error::LoadError;
use crate::handler::Handler;
use crate::modules::Endpoint;
use crate::routing::resolver::{self, ResolveInput};

/// A resolved URL path: a single string, or an ordered set when a branch
/// root's descriptor declared several surviving alternatives.
///
/// Binders receive method routes only, which are always scalar; callers
/// inspecting branch context must handle the `Many` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePath {
    One(String),
    Many(Vec<String>),
}

impl RoutePath {
    /// The scalar path, if this is not an ambiguous set.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            RoutePath::One(path) => Some(path),
            RoutePath::Many(_) => None,
        }
    }

    /// The path children resolve against: the scalar, or the first
    /// alternative of an ambiguous set.
    pub(crate) fn head(&self) -> &str {
        match self {
            RoutePath::One(path) => path,
            RoutePath::Many(paths) => paths.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// One discovered route: a branch root (no method) or a method leaf.
#[derive(Debug)]
pub struct Route {
    /// Positional name: directory or file basename, original case.
    pub key: String,
    /// Resolved URL path.
    pub path: RoutePath,
    /// Normalized mount prefix: empty, or leading-slash-prefixed with no
    /// trailing slash. Carried separately from `path` for the binder.
    pub prefix: String,
    /// Lower-cased HTTP verb; `None` for a branch root.
    pub method: Option<String>,
    /// Callable(s) backing a method route; `None` for a branch root.
    pub handler: Option<Handler>,
    /// The loaded module value backing this node, if any.
    pub endpoint: Option<Arc<Endpoint>>,
    /// Location of the backing module (or the directory when none
    /// exists). Diagnostics and test correlation only.
    pub filepath: PathBuf,
    /// Enclosing branch root. Weak: alive during the walk, not owned.
    pub parent: Option<Weak<Route>>,
}

/// Constructor input for [`Route::new`].
pub(crate) struct RouteParts<'a> {
    pub key: &'a str,
    pub filepath: &'a Path,
    pub endpoint: Option<Arc<Endpoint>>,
    pub parent: Option<&'a Arc<Route>>,
    pub prefix: &'a str,
    pub method: Option<&'a str>,
}

impl Route {
    pub(crate) fn new(parts: RouteParts<'_>) -> Result<Arc<Self>, LoadError> {
        let RouteParts {
            key,
            filepath,
            endpoint,
            parent,
            prefix,
            method,
        } = parts;

        let prefix = resolver::normalize_prefix(prefix);
        let parent_path = parent.map(|p| p.path.head()).unwrap_or("");

        let path = resolver::resolve_path(ResolveInput {
            key,
            parent_path,
            parent_endpoint: parent.and_then(|p| p.endpoint.as_ref()),
            endpoint: endpoint.as_ref(),
            method: method.is_some(),
            filepath,
        })?;

        let handler = match method {
            Some(_) => Some(resolve_handler(endpoint.as_deref(), filepath)?),
            None => None,
        };

        Ok(Arc::new(Route {
            key: key.to_string(),
            path,
            prefix,
            method: method.map(str::to_lowercase),
            handler,
            endpoint,
            filepath: filepath.to_path_buf(),
            parent: parent.map(Arc::downgrade),
        }))
    }

    /// The enclosing branch root, while the walk keeps it alive.
    pub fn parent(&self) -> Option<Arc<Route>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

/// A method route must resolve to a callable or a non-empty chain.
fn resolve_handler(endpoint: Option<&Endpoint>, filepath: &Path) -> Result<Handler, LoadError> {
    let handler = match endpoint {
        Some(Endpoint::Handler(handler)) => Some(handler.clone()),
        Some(Endpoint::Descriptor(descriptor)) => descriptor.handler.clone(),
        _ => None,
    };

    match handler {
        Some(handler) if !handler.is_empty() => Ok(handler),
        _ => Err(LoadError::InvalidHandler {
            filepath: filepath.to_path_buf(),
        }),
    }
}
