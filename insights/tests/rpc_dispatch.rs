//! Name-based dispatch of endpoint calls with JSON parameters.

use insights::{
    AccessPolicy, ApiError, DocType, InsightsApi, MemoryCache, MemoryStore,
    rpc::{METHODS, handle_method},
};
use serde_json::{Value, json};

fn api() -> InsightsApi<MemoryStore, MemoryCache> {
    InsightsApi::new(MemoryStore::new(), MemoryCache::new())
}

#[tokio::test]
async fn dispatches_with_and_without_module_prefix() {
    let api = api();
    let params = json!({"fieldtype": "int"});

    let bare = handle_method(&api, "get_operator_list", params.clone()).await.unwrap();
    let prefixed = handle_method(&api, "insights.api.get_operator_list", params).await.unwrap();

    assert_eq!(bare, prefixed);
    assert_eq!(bare.as_array().map(Vec::len), Some(10));
    assert_eq!(bare[0], json!({"label": "equals", "value": "="}));
}

#[tokio::test]
async fn null_params_mean_no_arguments() {
    let api = api();

    let operators = handle_method(&api, "get_operator_list", Value::Null).await.unwrap();
    assert_eq!(operators.as_array().map(Vec::len), Some(3));

    let tables = handle_method(&api, "get_tables", Value::Null).await.unwrap();
    assert_eq!(tables, json!([]));
}

#[tokio::test]
async fn menu_options_require_a_fieldtype() {
    let api = api();

    let menu = handle_method(&api, "get_column_menu_options", json!({"fieldtype": "date"}))
        .await
        .unwrap();
    assert_eq!(menu["format_options"][0], json!({"label": "Year", "value": "Year"}));

    let err = handle_method(&api, "get_column_menu_options", json!({})).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest { .. }));
}

#[tokio::test]
async fn create_then_list_over_dispatch() {
    let api = api();

    let name = handle_method(&api, "create_dashboard", json!({"title": "Ops"})).await.unwrap();
    let name = name.as_str().unwrap().to_string();

    let dashboards = handle_method(&api, "get_dashboard_list", json!({})).await.unwrap();
    assert_eq!(dashboards[0]["name"], json!(name));
    assert_eq!(dashboards[0]["title"], json!("Ops"));

    let query = handle_method(
        &api,
        "create_query",
        json!({"title": "Revenue", "data_source": "shop", "table": {"value": "orders", "label": "Orders"}}),
    )
    .await
    .unwrap();
    let queries = handle_method(&api, "get_queries", Value::Null).await.unwrap();
    assert_eq!(queries[0]["name"], query);
    assert_eq!(queries[0]["tables"], json!("Orders"));
}

#[tokio::test]
async fn endpoint_errors_pass_through_unchanged() {
    let api = api().with_access(AccessPolicy::readable(std::iter::empty()));

    let err = handle_method(&api, "get_queries", Value::Null).await.unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { doctype: DocType::Query }));

    let err = handle_method(&api, "create_dashboard", json!({"title": ""})).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn unknown_method_and_bad_params_are_invalid_requests() {
    let api = api();

    let err = handle_method(&api, "insights.api.drop_everything", json!({})).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid request: unknown method: drop_everything");

    let err = handle_method(&api, "create_dashboard", json!({"title": 7})).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid request: invalid params for create_dashboard"));
}

#[tokio::test]
async fn list_methods_covers_the_method_table() {
    let api = api();

    let listed = handle_method(&api, "list_methods", Value::Null).await.unwrap();
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["method"].as_str())
        .collect();
    let expected: Vec<&str> = METHODS.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, expected);

    for name in expected.iter().filter(|name| **name != "list_methods") {
        let err = handle_method(&api, name, json!("not an object")).await;
        if let Err(err) = err {
            assert!(matches!(err, ApiError::InvalidRequest { .. }), "{name}: {err}");
        }
    }
}

#[tokio::test]
async fn version_dispatches() {
    let version = handle_method(&api(), "get_app_version", Value::Null).await.unwrap();
    assert_eq!(version, json!(env!("CARGO_PKG_VERSION")));
}
