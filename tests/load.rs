//! End-to-end discovery tests: real directory trees, registry-backed
//! modules, recording collaborators.

mod common;

use std::sync::Arc;

use autoroute::{load, Config, Descriptor, Endpoint, LoadError, PathDecl, Settings};
use common::*;

fn config(value: serde_json::Value) -> Config {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_method_files_bind_under_their_directory() {
    let mut fixture = Fixture::new();
    fixture.module("routes/1/get.js", endpoint("one-get"));
    fixture.module("routes/1/post.js", endpoint("one-post"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    let routes = load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(routes.len(), 2);
    assert_eq!(
        binder.mounts(),
        vec![
            ("get".to_string(), "/1".to_string()),
            ("post".to_string(), "/1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_nested_directories_extend_the_path() {
    let mut fixture = Fixture::new();
    fixture.module("routes/api/users/get.js", endpoint("users"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![("get".to_string(), "/api/users".to_string())]
    );
}

#[tokio::test]
async fn test_multiple_roots_are_walked() {
    let mut fixture = Fixture::new();
    fixture.module("a/get.js", endpoint("a-get"));
    fixture.module("a/delete.js", endpoint("a-delete"));
    fixture.module("b/users/post.js", endpoint("b-post"));
    fixture.module("b/users/put.js", endpoint("b-put"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) =
        fixture.into_settings(config(serde_json::json!({ "paths": ["a", "b"] })));
    let routes = load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(routes.len(), 4);
    assert_eq!(
        binder.mounts(),
        vec![
            ("delete".to_string(), "/".to_string()),
            ("get".to_string(), "/".to_string()),
            ("post".to_string(), "/users".to_string()),
            ("put".to_string(), "/users".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_endpoint_map_matches_one_file_to_several_methods() {
    let mut fixture = Fixture::new();
    fixture.module("routes/users/index.js", endpoint("users"));
    // "get" is claimed as a mapping key, so the file named after the
    // method must not bind by convention.
    fixture.module("routes/users/get.js", endpoint("shadowed"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({
        "paths": "routes",
        "endpoints": { "post": "index", "get": { "name": "index" } }
    })));
    let routes = load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(routes.len(), 2);
    assert_eq!(
        binder.mounts(),
        vec![
            ("get".to_string(), "/users".to_string()),
            ("post".to_string(), "/users".to_string()),
        ]
    );

    // Both method routes share the one loaded module.
    let first = routes[0].endpoint.as_ref().unwrap();
    let second = routes[1].endpoint.as_ref().unwrap();
    assert!(Arc::ptr_eq(first, second));
}

#[tokio::test]
async fn test_sibling_branch_module_overrides_the_path() {
    let mut fixture = Fixture::new();
    fixture.module(
        "routes/params.js",
        Endpoint::Descriptor(Descriptor {
            path: Some(PathDecl::One("custom".to_string())),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/params/get.js", endpoint("params"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    let routes = load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(
        binder.mounts(),
        vec![("get".to_string(), "/custom".to_string())]
    );
}

#[tokio::test]
async fn test_index_module_backs_the_branch_unless_a_sibling_exists() {
    let mut fixture = Fixture::new();
    // Index-backed branch.
    fixture.module(
        "routes/accounts/index.js",
        Endpoint::Descriptor(Descriptor {
            path: Some(PathDecl::One("acct".to_string())),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/accounts/get.js", endpoint("accounts"));
    // Branch with both forms: the sibling wins.
    fixture.module(
        "routes/orders.js",
        Endpoint::Descriptor(Descriptor {
            path: Some(PathDecl::One("won".to_string())),
            ..Descriptor::default()
        }),
    );
    fixture.module(
        "routes/orders/index.js",
        Endpoint::Descriptor(Descriptor {
            path: Some(PathDecl::One("lost".to_string())),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/orders/get.js", endpoint("orders"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![
            ("get".to_string(), "/acct".to_string()),
            ("get".to_string(), "/won".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_string_export_renames_a_segment() {
    let mut fixture = Fixture::new();
    fixture.module("routes/shop.js", Endpoint::Alias("store".to_string()));
    fixture.module("routes/shop/get.js", endpoint("shop"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![("get".to_string(), "/store".to_string())]
    );
}

#[tokio::test]
async fn test_rewrite_marker_replaces_the_enclosing_segment() {
    let mut fixture = Fixture::new();
    fixture.module(
        "routes/x/y/z.js",
        Endpoint::Descriptor(Descriptor {
            path: Some(PathDecl::One("~/alt".to_string())),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/x/y/z/get.js", endpoint("rewritten"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![("get".to_string(), "/x/alt".to_string())]
    );
}

#[tokio::test]
async fn test_url_override_escapes_the_prefix() {
    let mut fixture = Fixture::new();
    fixture.module(
        "routes/4/get.js",
        Endpoint::Descriptor(Descriptor {
            url: Some("/stars".to_string()),
            handler: Some(ok_handler("stars")),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/4/post.js", endpoint("four"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({
        "paths": { "path": "routes", "prefix": "v1" }
    })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![
            ("get".to_string(), "/stars".to_string()),
            ("post".to_string(), "/v1/4".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_root_branch_module_supplies_the_prefix() {
    let mut fixture = Fixture::new();
    fixture.module(
        "routes.js",
        Endpoint::Descriptor(Descriptor {
            prefix: Some("api".to_string()),
            ..Descriptor::default()
        }),
    );
    fixture.module("routes/users/get.js", endpoint("users"));

    let binder = Arc::new(RecordingBinder::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    load(settings.binder(binder.clone())).await.unwrap();

    assert_eq!(
        binder.mounts(),
        vec![("get".to_string(), "/api/users".to_string())]
    );
}

#[tokio::test]
async fn test_loading_twice_yields_the_same_table() {
    let mut fixture = Fixture::new();
    fixture.module("routes/1/get.js", endpoint("one"));
    fixture.module("routes/2/post.js", endpoint("two"));

    let Fixture { dir, loader } = fixture;
    let loader = Arc::new(loader);
    let config = config(serde_json::json!({ "paths": "routes" }));

    let mut tables = Vec::new();
    for _ in 0..2 {
        let binder = Arc::new(RecordingBinder::default());
        let settings = Settings::new(config.clone())
            .base_dir(dir.path())
            .module_loader(loader.clone())
            .binder(binder.clone());
        load(settings).await.unwrap();
        tables.push(binder.mounts());
    }

    assert_eq!(tables[0], tables[1]);
    assert_eq!(tables[0].len(), 2);
}

#[tokio::test]
async fn test_tree_without_modules_produces_no_routes() {
    let fixture = Fixture::new();
    fixture.mkdir("routes/empty");
    fixture.stray_file("routes/readme.txt");
    fixture.stray_file("routes/empty/notes.txt");

    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    let routes = load(settings).await.unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn test_method_module_without_callable_is_fatal() {
    let mut fixture = Fixture::new();
    fixture.module(
        "routes/1/get.js",
        Endpoint::Descriptor(Descriptor::default()),
    );

    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    let err = load(settings).await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidHandler { filepath } if filepath.ends_with("get.js")));
}

#[tokio::test]
async fn test_missing_root_directory_is_an_io_error() {
    let fixture = Fixture::new();
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "nope" })));
    assert!(matches!(load(settings).await, Err(LoadError::Io { .. })));
}

#[tokio::test]
async fn test_adapter_hooks_wrap_the_walk() {
    let mut fixture = Fixture::new();
    fixture.module("routes/1/get.js", endpoint("one"));
    fixture.module("routes/2/post.js", endpoint("two"));

    let adapter = Arc::new(CountingAdapter::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({ "paths": "routes" })));
    let routes = load(settings.adapter(adapter.clone())).await.unwrap();

    assert_eq!(routes.len(), 2);
    assert_eq!(adapter.before.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(adapter.handled.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(adapter.after.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_router_factory_groups_each_root() {
    let mut fixture = Fixture::new();
    fixture.module("a/get.js", endpoint("a"));
    fixture.module("b/get.js", endpoint("b-get"));
    fixture.module("b/post.js", endpoint("b-post"));

    let factory = Arc::new(SpyRouterFactory::default());
    let (settings, _dir) = fixture.into_settings(config(serde_json::json!({
        "paths": [ { "path": "a", "prefix": "v1" }, "b" ]
    })));
    load(settings.router(factory.clone())).await.unwrap();

    let mut prefixes = factory.created_prefixes.lock().unwrap().clone();
    prefixes.sort();
    assert_eq!(prefixes, vec!["".to_string(), "v1".to_string()]);
    assert_eq!(factory.handled.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(factory.finished.load(std::sync::atomic::Ordering::SeqCst), 2);
}
