//! In-memory module registry.
//!
//! The registry maps filesystem paths to endpoints registered in code.
//! It is the module loader of choice for embedders that keep handlers in
//! the binary (and for tests): route *discovery* still follows the real
//! directory tree, only the backing values come from the table.
//!
//! Repeated loads of one path return the same `Arc`, matching the
//! caching behavior the resolver's identity guard relies on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::modules::{Endpoint, ModuleLoader};

/// Module loader backed by a programmatic path → endpoint table.
pub struct RegistryLoader {
    extension: String,
    modules: HashMap<PathBuf, Arc<Endpoint>>,
}

impl RegistryLoader {
    /// Create an empty registry recognizing files with `extension`.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            modules: HashMap::new(),
        }
    }

    /// Register the endpoint backing `path`. Paths are compared exactly
    /// as the walker produces them (absolute, extension included).
    pub fn register(&mut self, path: impl Into<PathBuf>, endpoint: Endpoint) {
        self.modules.insert(path.into(), Arc::new(endpoint));
    }
}

#[async_trait]
impl ModuleLoader for RegistryLoader {
    fn extension(&self) -> &str {
        &self.extension
    }

    async fn exists(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    async fn load(&self, path: &Path) -> Result<Option<Arc<Endpoint>>, LoadError> {
        Ok(self.modules.get(path).cloned())
    }
}
