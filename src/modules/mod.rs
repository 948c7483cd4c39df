//! Module resolution: the values backing tree nodes.
//!
//! # Data Flow
//! ```text
//! filesystem path (directory sibling, index file, or leaf file)
//!     → ModuleLoader (pluggable: registry, manifest, …)
//!     → Endpoint (tagged variant, decided once at load time)
//!     → Path Resolver / Tree Walker branch on the tag
//! ```
//!
//! # Design Decisions
//! - Endpoint shape is a tagged variant, not ad hoc property probing
//! - Loaded endpoints are `Arc`-shared so the resolver can compare module
//!   identity (a branch's own descriptor must not be applied twice)
//! - A path the loader cannot resolve is `None`, never an error

pub mod manifest;
pub mod registry;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::schema::EndpointMap;
use crate::error::LoadError;
use crate::handler::Handler;

/// The loaded value backing a tree node.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// A callable export: one handler or a middleware chain.
    Handler(Handler),
    /// An object export with path overrides and/or a handler.
    Descriptor(Descriptor),
    /// A plain string export; names a path segment (or, at a configured
    /// root, a mount prefix).
    Alias(String),
}

/// Object-shaped endpoint: overrides consumed by the path resolver plus
/// branch-level settings consumed at a configured root.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    /// Literal URL; bypasses all joining and prefixing.
    pub url: Option<String>,
    /// Path declaration run through the segment extractor.
    pub path: Option<PathDecl>,
    /// Mount prefix (branch modules at a configured root only).
    pub prefix: Option<String>,
    /// Per-branch endpoint map (branch modules at a configured root only).
    pub endpoints: Option<EndpointMap>,
    /// Handler backing method routes matched to this module.
    pub handler: Option<Handler>,
}

/// A `path` declaration: one candidate or an ordered set of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PathDecl {
    One(String),
    Many(Vec<String>),
}

/// Resolves filesystem paths to the modules backing them.
///
/// Implementations must distinguish a callable export, an object export,
/// and a string export; see [`Endpoint`].
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// File extension (without the dot) of module files this loader
    /// resolves. The walker ignores files with any other extension.
    fn extension(&self) -> &str;

    /// True when `path` resolves to a module.
    async fn exists(&self, path: &Path) -> bool;

    /// Load the module at `path` (extension included). `None` when the
    /// path does not resolve to a module.
    async fn load(&self, path: &Path) -> Result<Option<Arc<Endpoint>>, LoadError>;
}
