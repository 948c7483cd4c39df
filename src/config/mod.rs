//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (.autoroute.json or Cargo.toml metadata)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → threaded explicitly into the load entry point
//! ```
//!
//! # Design Decisions
//! - No process-wide mutable defaults: the configuration is an explicit
//!   value passed to `load`
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::Config;
pub use schema::EndpointMap;
pub use schema::EndpointSpec;
pub use schema::PathEntry;
pub use schema::Paths;
