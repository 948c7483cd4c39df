//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject capabilities that cannot be resolved from a config file
//! - Warn about endpoint-map keys that are not recognized HTTP methods
//!
//! # Design Decisions
//! - Runs before any walking begins; a rejected config never reaches the
//!   tree walker
//! - Loader and router names are resolved later, where the built-in
//!   registries live; this pass only checks shapes

use crate::config::schema::Config;
use crate::error::LoadError;
use crate::routing::methods;

/// Validate a configuration before loading.
pub fn validate_config(config: &Config) -> Result<(), LoadError> {
    if let Some(route) = &config.route {
        return Err(LoadError::UnsupportedRouteType(route.clone()));
    }

    for entry in config.paths.entries() {
        if entry.path.is_empty() {
            return Err(LoadError::EmptyPathEntry);
        }
    }

    for key in config.endpoints.keys() {
        if !methods::is_method(&key.to_lowercase()) {
            tracing::warn!(key = %key, "endpoint map key is not a recognized HTTP method");
        }
    }

    Ok(())
}
