//! Recognized HTTP method names.
//!
//! Lower-cased verb names a filename may bind to, either through an
//! endpoint map or through the convention fallback. `all` binds every
//! method at once.

pub const METHODS: [&str; 10] = [
    "all", "connect", "delete", "get", "head", "options", "patch", "post", "put", "trace",
];

/// True when `name` (already lower-cased) is a recognized method.
pub fn is_method(name: &str) -> bool {
    METHODS.contains(&name)
}
