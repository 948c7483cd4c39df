//! JSON manifest module loader.
//!
//! Resolves `.json` sidecar files into endpoints: a JSON string is a
//! string export, a JSON object is a descriptor. Handlers cannot live in
//! data files, so a descriptor's `handler` field names entries of a
//! handler table supplied at construction: `"handler": "list"` for a
//! single callable, `"handler": ["auth", "list"]` for a chain.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::schema::EndpointMap;
use crate::error::LoadError;
use crate::handler::{Handler, HandlerFn};
use crate::modules::{Descriptor, Endpoint, ModuleLoader, PathDecl};

/// Module loader reading `.json` descriptor files from disk.
#[derive(Default)]
pub struct ManifestLoader {
    handlers: HashMap<String, HandlerFn>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named handler referenced by manifest `handler` fields.
    pub fn register_handler(&mut self, name: impl Into<String>, handler: HandlerFn) {
        self.handlers.insert(name.into(), handler);
    }

    fn resolve_handler(&self, reference: HandlerRef, path: &Path) -> Result<Handler, LoadError> {
        let lookup = |name: String| -> Result<HandlerFn, LoadError> {
            self.handlers
                .get(&name)
                .cloned()
                .ok_or_else(|| LoadError::UnknownHandler {
                    name,
                    filepath: path.to_path_buf(),
                })
        };

        match reference {
            HandlerRef::One(name) => Ok(Handler::Single(lookup(name)?)),
            HandlerRef::Chain(names) => {
                let chain = names
                    .into_iter()
                    .map(lookup)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Handler::Chain(chain))
            }
        }
    }
}

/// On-disk shape of a manifest module.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestExport {
    Alias(String),
    Descriptor(ManifestDoc),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ManifestDoc {
    url: Option<String>,
    path: Option<PathDecl>,
    prefix: Option<String>,
    endpoints: Option<EndpointMap>,
    handler: Option<HandlerRef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HandlerRef {
    One(String),
    Chain(Vec<String>),
}

#[async_trait]
impl ModuleLoader for ManifestLoader {
    fn extension(&self) -> &str {
        "json"
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn load(&self, path: &Path) -> Result<Option<Arc<Endpoint>>, LoadError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let export: ManifestExport =
            serde_json::from_str(&content).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let endpoint = match export {
            ManifestExport::Alias(name) => Endpoint::Alias(name),
            ManifestExport::Descriptor(doc) => {
                let handler = doc
                    .handler
                    .map(|reference| self.resolve_handler(reference, path))
                    .transpose()?;
                Endpoint::Descriptor(Descriptor {
                    url: doc.url,
                    path: doc.path,
                    prefix: doc.prefix,
                    endpoints: doc.endpoints,
                    handler,
                })
            }
        };

        Ok(Some(Arc::new(endpoint)))
    }
}
