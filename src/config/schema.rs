//! Configuration schema definitions.
//!
//! This module defines the settings surface consumed by the load entry
//! point. All types derive Serde traits for deserialization from config
//! files; the same shapes can be built programmatically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for a load call.
///
/// Recognized keys mirror the settings surface of the discovery engine:
/// `adapter`, `endpoints`, `loader`, `paths`, `route`, `router`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Adapter name. Adapters carry code and cannot be resolved from a
    /// config file; naming one here is rejected during validation unless
    /// an adapter instance is injected through `Settings`.
    pub adapter: Option<String>,

    /// Global mapping of HTTP method name → expected module filename.
    pub endpoints: EndpointMap,

    /// Binder selection by name (`"axum"` is built in). Injected binders
    /// take precedence.
    pub loader: Option<String>,

    /// Root paths to walk: a single path, a descriptor, or a sequence.
    pub paths: Paths,

    /// Custom route type name. Not supported; the `Route` shape is fixed.
    pub route: Option<String>,

    /// Router factory selection by name (`"axum"` is built in).
    pub router: Option<String>,
}

/// Mapping of HTTP method name → expected filename (or descriptor).
///
/// Per-branch maps overlay the global map key by key.
pub type EndpointMap = BTreeMap<String, EndpointSpec>;

/// One entry of an endpoint map: a literal filename or a `{ name }`
/// descriptor whose `name` defaults to the method key itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EndpointSpec {
    Filename(String),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

/// The `paths` key: one path string, one descriptor, or a sequence of
/// either.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Paths {
    One(String),
    Many(Vec<PathItem>),
    Entry(PathEntry),
}

impl Default for Paths {
    fn default() -> Self {
        Paths::Many(Vec::new())
    }
}

impl Paths {
    /// Normalize to a flat list of path entries.
    pub fn entries(&self) -> Vec<PathEntry> {
        match self {
            Paths::One(path) => vec![PathEntry::plain(path)],
            Paths::Entry(entry) => vec![entry.clone()],
            Paths::Many(items) => items
                .iter()
                .map(|item| match item {
                    PathItem::Plain(path) => PathEntry::plain(path),
                    PathItem::Entry(entry) => entry.clone(),
                })
                .collect(),
        }
    }
}

/// One element of a `paths` sequence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathItem {
    Plain(String),
    Entry(PathEntry),
}

/// A configured root path with optional mount prefix and per-branch
/// endpoint map.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathEntry {
    /// Filesystem path of the root, relative to the base directory.
    pub path: String,

    /// Mount prefix for every route under this root.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Per-branch endpoint map, overlaying the global one.
    #[serde(default)]
    pub endpoints: Option<EndpointMap>,
}

impl PathEntry {
    fn plain(path: &str) -> Self {
        Self {
            path: path.to_string(),
            prefix: None,
            endpoints: None,
        }
    }
}
