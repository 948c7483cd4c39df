//! Error taxonomy for route loading.
//!
//! # Design Decisions
//! - Configuration errors are raised before any walking begins
//! - Resolution errors carry the offending file path for diagnostics
//! - A missing backing module is never an error (endpoint-less branch/leaf)
//! - No partial results: the first fatal error aborts the whole load call

use std::path::PathBuf;

use thiserror::Error;

/// Error type for the top-level load operation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configured loader name does not resolve to a known binder.
    #[error("unknown loader `{0}`")]
    UnknownLoader(String),

    /// The configured router name does not resolve to a known router factory.
    #[error("unknown router `{0}`")]
    UnknownRouter(String),

    /// Adapters cannot be resolved from a name; they must be injected.
    #[error("adapter `{0}` cannot be resolved by name; inject it through Settings")]
    UnresolvableAdapter(String),

    /// Custom route types are not supported; the `Route` shape is fixed.
    #[error("custom route type `{0}` is not supported")]
    UnsupportedRouteType(String),

    /// A configured path entry was empty.
    #[error("configured path entry has an empty path")]
    EmptyPathEntry,

    /// A matched method endpoint exposed no callable handler.
    #[error("invalid endpoint handler in {}", .filepath.display())]
    InvalidHandler { filepath: PathBuf },

    /// A method leaf declared a set of alternative paths.
    #[error("extending a set of paths is not supported ({})", .filepath.display())]
    PathSet { filepath: PathBuf },

    /// A route with more than one surviving path reached a scalar-only binder.
    #[error("route {} has no single path to bind", .filepath.display())]
    AmbiguousPath { filepath: PathBuf },

    /// Two discovered routes resolved to the same method and mount point.
    #[error("duplicate route: {method} {mount} is already bound")]
    DuplicateRoute { method: String, mount: String },

    /// A module referenced a handler name absent from the handler table.
    #[error("unknown handler `{name}` referenced by {}", .filepath.display())]
    UnknownHandler { name: String, filepath: PathBuf },

    /// Filesystem failure while walking or loading.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON module or configuration file failed to parse.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A TOML manifest failed to parse.
    #[error("failed to parse {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
