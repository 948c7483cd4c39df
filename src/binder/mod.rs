//! Binder dispatch: registering discovered routes against a host.
//!
//! # Data Flow
//! ```text
//! method Route (from the walker)
//!     → Binder::bind
//!         adapter present?      → Adapter::handle
//!         branch router present? → BranchRouter::handle
//!         otherwise             → direct registration
//! ```
//!
//! # Design Decisions
//! - Capability traits checked structurally, not class hierarchies:
//!   an adapter is optional `before`/`after` plus required `handle`,
//!   a router is `handle` plus a `finish` hook
//! - `before`/`after` run once per top-level load call, awaited
//! - A router factory is invoked once per configured root, grouping the
//!   root's routes under one mount

mod axum;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::schema::Config;
use crate::error::LoadError;
use crate::routing::route::Route;
use crate::routing::walker::Branch;

pub use self::axum::AxumBinder;
pub use self::axum::AxumRouterFactory;

/// Registers one discovered method route against a host server.
///
/// Implementations own the dispatch order: an adapter overrides a branch
/// router, which overrides direct registration.
#[async_trait]
pub trait Binder: Send + Sync {
    async fn bind(
        &self,
        route: &Arc<Route>,
        adapter: Option<Arc<dyn Adapter>>,
        router: Option<Arc<dyn BranchRouter>>,
    ) -> Result<(), LoadError>;
}

/// Intercepts route registration, with optional load-wide hooks.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Runs once before any walking begins.
    async fn before(&self, config: &Config) -> Result<(), LoadError> {
        let _ = config;
        Ok(())
    }

    /// Registers one route.
    async fn handle(&self, route: &Arc<Route>) -> Result<(), LoadError>;

    /// Runs once after every root has settled.
    async fn after(&self, config: &Config) -> Result<(), LoadError> {
        let _ = config;
        Ok(())
    }
}

/// Groups one configured root's routes under a shared mount.
#[async_trait]
pub trait BranchRouter: Send + Sync {
    /// Registers one route of the branch.
    async fn handle(&self, route: &Arc<Route>) -> Result<(), LoadError>;

    /// Called once after the branch's walk has settled.
    async fn finish(&self) -> Result<(), LoadError> {
        Ok(())
    }
}

/// Creates one [`BranchRouter`] per configured root path.
pub trait RouterFactory: Send + Sync {
    fn create(&self, branch: &Branch) -> Result<Arc<dyn BranchRouter>, LoadError>;
}
