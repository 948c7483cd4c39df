//! Endpoint matching: which declared methods a file satisfies.
//!
//! # Responsibilities
//! - Overlay per-branch endpoint maps on the global one
//! - Match a file's case-folded basename against declared filenames
//! - Decide the convention fallback (filename *is* a method name)
//!
//! # Design Decisions
//! - Filename comparison is case-insensitive
//! - Several method keys may claim one file; the file then produces one
//!   route per method
//! - The fallback claim check consults the global map only: a per-branch
//!   remapping does not block the convention for other branches

use crate::config::schema::{EndpointMap, EndpointSpec};
use crate::routing::methods;

/// Merge the global endpoint map with a branch's map; branch entries win.
pub(crate) fn merge(global: &EndpointMap, branch: &EndpointMap) -> EndpointMap {
    let mut merged = global.clone();
    for (key, spec) in branch {
        merged.insert(key.clone(), spec.clone());
    }
    merged
}

/// Every declared method `filename` satisfies, in map order.
///
/// `filename` is the extension-stripped, lower-cased basename.
pub(crate) fn match_methods(filename: &str, matchers: &EndpointMap) -> Vec<String> {
    let mut matched = Vec::new();

    for (key, spec) in matchers {
        let method = key.to_lowercase();
        if !methods::is_method(&method) {
            continue;
        }

        let expected = match spec {
            EndpointSpec::Filename(name) => name.as_str(),
            EndpointSpec::Named { name } => name.as_deref().unwrap_or(key.as_str()),
        };

        if expected.eq_ignore_ascii_case(filename) {
            matched.push(method);
        }
    }

    matched
}

/// True when `filename` should bind as its own method: nothing matched,
/// no global mapping claims the name as a key, and the name is a
/// recognized method.
pub(crate) fn convention_fallback(filename: &str, matched: bool, global: &EndpointMap) -> bool {
    !matched && !global.contains_key(filename) && methods::is_method(filename)
}
