//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! configured root path
//!     → walker.rs (async-recursive directory walk)
//!     → matcher.rs (filename → declared HTTP methods)
//!     → resolver.rs (positional key + overrides → URL path)
//!     → route.rs (immutable Route entities)
//!     → binder dispatch (side effect per method route)
//! ```
//!
//! # Design Decisions
//! - Discovery is build-time only: no request-time matching, dynamic
//!   segments are opaque strings copied through
//! - Path resolution is pure; all I/O lives in the walker
//! - Route discovery order follows the underlying directory listing,
//!   which is filesystem-defined, not alphabetic

pub(crate) mod matcher;
pub mod methods;
pub(crate) mod resolver;
pub mod route;
pub mod walker;

pub use route::Route;
pub use route::RoutePath;
pub use walker::Branch;
