//! Path resolution.
//!
//! # Responsibilities
//! - Compute a node's URL path from its positional key, its parent's
//!   already-resolved path, and any override directives on its endpoint
//! - Implement the segment extractor, including the `~/` rewrite marker
//! - Normalize mount prefixes
//!
//! # Design Decisions
//! - Pure string computation; never touches the filesystem, never awaits
//! - Precedence: `url` > `path` declaration > string alias > positional
//!   default; a method leaf with no overrides inherits the parent path
//!   unchanged (the method itself adds no segment)
//! - A branch's own descriptor is never applied twice: when a leaf's
//!   endpoint *is* the parent's endpoint (same `Arc`), its `path`
//!   declaration is skipped at the leaf

use std::path::Path;
use std::sync::Arc;

use crate::error::LoadError;
use crate::modules::{Endpoint, PathDecl};
use crate::routing::route::RoutePath;

/// Inputs to one resolution step.
pub(crate) struct ResolveInput<'a> {
    /// Positional name of the node (directory or file basename).
    pub key: &'a str,
    /// The parent's resolved path; empty at a configured root.
    pub parent_path: &'a str,
    /// The parent's endpoint, for the identity guard.
    pub parent_endpoint: Option<&'a Arc<Endpoint>>,
    /// The node's endpoint, if any.
    pub endpoint: Option<&'a Arc<Endpoint>>,
    /// True when resolving a method leaf.
    pub method: bool,
    /// Offending-file context for fatal errors.
    pub filepath: &'a Path,
}

/// Resolve the URL path of one node.
pub(crate) fn resolve_path(input: ResolveInput<'_>) -> Result<RoutePath, LoadError> {
    let ResolveInput {
        key,
        parent_path,
        parent_endpoint,
        endpoint,
        method,
        filepath,
    } = input;

    if method {
        if let Some(Endpoint::Descriptor(descriptor)) = endpoint.map(Arc::as_ref) {
            if let Some(url) = &descriptor.url {
                return Ok(RoutePath::One(url.clone()));
            }

            let own_descriptor = matches!(
                (parent_endpoint, endpoint),
                (Some(parent), Some(own)) if Arc::ptr_eq(parent, own)
            );

            if let Some(decl) = &descriptor.path {
                if !own_descriptor {
                    // A method leaf binds exactly one path.
                    if matches!(decl, PathDecl::Many(_)) {
                        return Err(LoadError::PathSet {
                            filepath: filepath.to_path_buf(),
                        });
                    }
                    let mut paths = extract(decl, parent_path);
                    return Ok(RoutePath::One(paths.remove(0)));
                }
            }
        }

        return Ok(RoutePath::One(parent_path.to_string()));
    }

    match endpoint.map(Arc::as_ref) {
        Some(Endpoint::Alias(segment)) => {
            Ok(RoutePath::One(join_segment(parent_path, segment)))
        }
        Some(Endpoint::Descriptor(descriptor)) => {
            if let Some(url) = &descriptor.url {
                Ok(RoutePath::One(url.clone()))
            } else if let Some(decl) = &descriptor.path {
                let mut paths = extract(decl, parent_path);
                if paths.len() == 1 {
                    Ok(RoutePath::One(paths.remove(0)))
                } else {
                    Ok(RoutePath::Many(paths))
                }
            } else {
                Ok(RoutePath::One(join_segment(parent_path, key)))
            }
        }
        _ => Ok(RoutePath::One(join_segment(parent_path, key))),
    }
}

/// Run every candidate of a `path` declaration through the segment
/// extractor.
pub(crate) fn extract(decl: &PathDecl, parent_path: &str) -> Vec<String> {
    let tips: Vec<&str> = match decl {
        PathDecl::One(tip) => vec![tip.as_str()],
        PathDecl::Many(tips) => tips.iter().map(String::as_str).collect(),
    };

    tips.into_iter()
        .map(|tip| extract_one(tip, parent_path))
        .collect()
}

/// Segment extractor for one candidate.
///
/// `~/<tail>` rewrites against the grandparent: the parent path is cut
/// at its last slash and the tail attaches to what remains, discarding
/// the immediate enclosing segment.
fn extract_one(tip: &str, parent_path: &str) -> String {
    let tip = tip.strip_suffix('/').unwrap_or(tip);

    if let Some(tail) = tip.strip_prefix("~/") {
        let cut = parent_path.rfind('/').unwrap_or(0);
        let prefix = &parent_path[..cut];
        if prefix.is_empty() || prefix == "/" {
            tail.to_string()
        } else {
            format!("{prefix}/{tail}")
        }
    } else {
        let tail = tip.strip_prefix('/').unwrap_or(tip);
        if parent_path.is_empty() || parent_path == "/" {
            tail.to_string()
        } else if tail.is_empty() {
            parent_path.to_string()
        } else {
            format!("{parent_path}/{tail}")
        }
    }
}

/// Normalize a mount prefix: one trailing slash stripped, leading slash
/// enforced when non-empty.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    if prefix.is_empty() || prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    }
}

fn join_segment(parent_path: &str, segment: &str) -> String {
    if parent_path.is_empty() {
        segment.to_string()
    } else {
        format!("{parent_path}/{segment}")
    }
}
