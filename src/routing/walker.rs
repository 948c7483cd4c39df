//! Recursive tree walker.
//!
//! # Data Flow
//! ```text
//! configured root directory
//!     → list entries (tokio::fs, listing order)
//!     → resolve branch module (sibling `<dir>.<ext>` wins over
//!       `<dir>/index.<ext>`)
//!     → branch-root Route (path context for descendants)
//!     → per entry, fanned out concurrently:
//!         directory → recurse with the branch root as parent
//!         file      → endpoint matcher → method Route(s) → binder
//!     → join, preserving listing order
//! ```
//!
//! # Design Decisions
//! - Every filesystem probe is async; path computation never suspends
//! - Sibling entries proceed concurrently; binder side effects may
//!   interleave, the returned collection keeps listing order
//! - Branch roots are parent context only; the returned table holds
//!   method routes exclusively
//! - The first fatal error aborts the whole walk, no partial results

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future;

use crate::binder::{Adapter, Binder, BranchRouter};
use crate::config::schema::EndpointMap;
use crate::error::LoadError;
use crate::handler::{BoxFuture, Handler};
use crate::modules::{Endpoint, ModuleLoader};
use crate::routing::route::{Route, RouteParts};
use crate::routing::matcher;

/// Per-root branch configuration: the path entry merged with whatever
/// branch module the root carried.
#[derive(Debug, Clone, Default)]
pub struct Branch {
    /// Source path of the configured root (filesystem, not URL).
    pub path: String,
    /// Mount prefix applied to every route under this root.
    pub prefix: String,
    /// Per-branch endpoint map, overlaying the global one.
    pub endpoints: EndpointMap,
    /// Handler exported by the root's branch module, if callable.
    pub handler: Option<Handler>,
}

/// Immutable state threaded through one root's walk.
pub(crate) struct WalkContext {
    pub loader: Arc<dyn ModuleLoader>,
    pub binder: Arc<dyn Binder>,
    pub adapter: Option<Arc<dyn Adapter>>,
    pub router: Option<Arc<dyn BranchRouter>>,
    /// Global endpoint map (convention-fallback claim checks).
    pub endpoints: EndpointMap,
    /// Global map overlaid with the branch map (method matching).
    pub matchers: EndpointMap,
    pub branch: Branch,
}

/// Walk one configured root and return its method routes.
pub(crate) async fn walk_root(
    ctx: Arc<WalkContext>,
    dir: PathBuf,
) -> Result<Vec<Arc<Route>>, LoadError> {
    collect(ctx, String::new(), dir, None).await
}

/// Candidate path of a directory's sibling module: `<dir>.<ext>`.
pub(crate) fn sibling_module(dir: &Path, extension: &str) -> PathBuf {
    let mut path = dir.as_os_str().to_os_string();
    path.push(format!(".{extension}"));
    PathBuf::from(path)
}

/// Candidate path of a directory's index module: `<dir>/index.<ext>`.
pub(crate) fn index_module(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!("index.{extension}"))
}

/// Resolve a directory's backing module. The sibling form wins over the
/// internal index file when both exist.
pub(crate) async fn resolve_branch_module(
    loader: &Arc<dyn ModuleLoader>,
    dir: &Path,
) -> Result<(Option<Arc<Endpoint>>, PathBuf), LoadError> {
    let extension = loader.extension();
    let sibling = sibling_module(dir, extension);
    let index = index_module(dir, extension);

    let (has_sibling, has_index) = tokio::join!(loader.exists(&sibling), loader.exists(&index));

    if has_sibling {
        Ok((loader.load(&sibling).await?, sibling))
    } else if has_index {
        Ok((loader.load(&index).await?, index))
    } else {
        Ok((None, dir.to_path_buf()))
    }
}

fn collect(
    ctx: Arc<WalkContext>,
    key: String,
    dir: PathBuf,
    parent: Option<Arc<Route>>,
) -> BoxFuture<Result<Vec<Arc<Route>>, LoadError>> {
    Box::pin(async move {
        let mut entries = Vec::new();
        let mut listing = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| LoadError::Io {
                path: dir.clone(),
                source,
            })?;
        while let Some(entry) = listing.next_entry().await.map_err(|source| LoadError::Io {
            path: dir.clone(),
            source,
        })? {
            entries.push(entry);
        }

        let (module, module_path) = resolve_branch_module(&ctx.loader, &dir).await?;

        let root = Route::new(RouteParts {
            key: &key,
            filepath: &module_path,
            endpoint: module.clone(),
            parent: parent.as_ref(),
            prefix: &ctx.branch.prefix,
            method: None,
        })?;

        tracing::debug!(
            dir = %dir.display(),
            path = ?root.path,
            entries = entries.len(),
            "walking directory"
        );

        let extension = ctx.loader.extension().to_string();

        let tasks: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let ctx = ctx.clone();
                let root = root.clone();
                let branch_module = module.clone();
                let branch_module_path = module_path.clone();
                let extension = extension.clone();

                async move {
                    let path = entry.path();
                    let file_type =
                        entry
                            .file_type()
                            .await
                            .map_err(|source| LoadError::Io {
                                path: path.clone(),
                                source,
                            })?;

                    if file_type.is_dir() {
                        let name = entry.file_name().to_string_lossy().into_owned();
                        return collect(ctx, name, path, Some(root)).await;
                    }

                    leaf_routes(
                        &ctx,
                        &root,
                        &path,
                        &extension,
                        branch_module.as_ref(),
                        &branch_module_path,
                    )
                    .await
                }
            })
            .collect();

        let collected = future::try_join_all(tasks).await?;

        let mut routes = Vec::new();
        for items in collected {
            routes.extend(items);
        }
        Ok(routes)
    })
}

/// Resolve one file entry into zero or more method routes, handing each
/// to the binder as it is produced.
async fn leaf_routes(
    ctx: &WalkContext,
    root: &Arc<Route>,
    path: &Path,
    extension: &str,
    branch_module: Option<&Arc<Endpoint>>,
    branch_module_path: &Path,
) -> Result<Vec<Arc<Route>>, LoadError> {
    let mut routes = Vec::new();

    let matches_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == extension)
        .unwrap_or(false);
    if !matches_extension {
        return Ok(routes);
    }

    let Some(filename) = path.file_stem().and_then(|stem| stem.to_str()) else {
        return Ok(routes);
    };
    let filename = filename.to_lowercase();

    // Reuse the branch module's Arc when the leaf is that same file, so
    // the resolver's identity guard holds.
    let endpoint = match branch_module {
        Some(module) if path == branch_module_path => Some(module.clone()),
        _ => ctx.loader.load(path).await?,
    };
    let Some(endpoint) = endpoint else {
        tracing::debug!(file = %path.display(), "no backing module, skipping");
        return Ok(routes);
    };

    let matched_methods = matcher::match_methods(&filename, &ctx.matchers);
    let matched = !matched_methods.is_empty();

    for method in matched_methods {
        let route = Route::new(RouteParts {
            key: &root.key,
            filepath: path,
            endpoint: Some(endpoint.clone()),
            parent: Some(root),
            prefix: &ctx.branch.prefix,
            method: Some(&method),
        })?;
        bind(ctx, &route).await?;
        routes.push(route);
    }

    if matcher::convention_fallback(&filename, matched, &ctx.endpoints) {
        let route = Route::new(RouteParts {
            key: &root.key,
            filepath: path,
            endpoint: Some(endpoint),
            parent: Some(root),
            prefix: &ctx.branch.prefix,
            method: Some(&filename),
        })?;
        bind(ctx, &route).await?;
        routes.push(route);
    }

    Ok(routes)
}

async fn bind(ctx: &WalkContext, route: &Arc<Route>) -> Result<(), LoadError> {
    tracing::debug!(
        path = ?route.path,
        method = route.method.as_deref().unwrap_or(""),
        file = %route.filepath.display(),
        "route discovered"
    );
    ctx.binder
        .bind(route, ctx.adapter.clone(), ctx.router.clone())
        .await
}
