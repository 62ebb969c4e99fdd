//! Name-based JSON dispatch onto [`InsightsApi`].
//!
//! Callers address endpoints by method name (optionally with the `insights.api.`
//! module prefix) and pass a JSON object of keyword arguments.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{api::InsightsApi, cache::KeyCache, errors::ApiError, store::DocumentStore, types::TableRef};

pub const METHOD_PREFIX: &str = "insights.api.";

/// Dispatchable methods and a one-line description of each.
pub const METHODS: &[(&str, &str)] = &[
    ("list_methods", "List dispatchable methods"),
    ("get_app_version", "Version of the Insights API"),
    ("get_operator_list", "Filter operators for a field type {fieldtype?}"),
    ("get_column_menu_options", "Aggregation and format options for a field type {fieldtype}"),
    ("get_data_sources", "List data sources"),
    ("get_tables", "List tables of a data source {data_source?}"),
    ("get_dashboard_list", "List dashboards"),
    ("create_dashboard", "Create a dashboard {title}"),
    ("get_queries", "List saved queries with their table labels"),
    ("create_query", "Create a query {title, data_source, table: {value, label}}"),
];

#[derive(Debug, Deserialize)]
struct OperatorListParams {
    #[serde(default)]
    fieldtype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MenuOptionsParams {
    fieldtype: String,
}

#[derive(Debug, Deserialize)]
struct TablesParams {
    #[serde(default)]
    data_source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateDashboardParams {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CreateQueryParams {
    title: String,
    data_source: String,
    table: TableRef,
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, ApiError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|err| ApiError::invalid(format!("invalid params for {method}: {err}")))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

pub async fn handle_method<S, C>(api: &InsightsApi<S, C>, method: &str, params: Value) -> Result<Value, ApiError>
where
    S: DocumentStore,
    C: KeyCache,
{
    let method = method.strip_prefix(METHOD_PREFIX).unwrap_or(method);
    let value = match method {
        "list_methods" => json!(
            METHODS
                .iter()
                .map(|(name, description)| json!({"method": name, "description": description}))
                .collect::<Vec<_>>()
        ),
        "get_app_version" => to_json(api.get_app_version())?,
        "get_operator_list" => {
            let params: OperatorListParams = parse_params(method, params)?;
            to_json(api.get_operator_list(params.fieldtype.as_deref()))?
        }
        "get_column_menu_options" => {
            let params: MenuOptionsParams = parse_params(method, params)?;
            to_json(api.get_column_menu_options(&params.fieldtype))?
        }
        "get_data_sources" => to_json(api.get_data_sources().await?)?,
        "get_tables" => {
            let params: TablesParams = parse_params(method, params)?;
            to_json(api.get_tables(params.data_source.as_deref()).await?)?
        }
        "get_dashboard_list" => to_json(api.get_dashboard_list().await?)?,
        "create_dashboard" => {
            let params: CreateDashboardParams = parse_params(method, params)?;
            to_json(api.create_dashboard(&params.title).await?)?
        }
        "get_queries" => to_json(api.get_queries().await?)?,
        "create_query" => {
            let params: CreateQueryParams = parse_params(method, params)?;
            to_json(api.create_query(&params.title, &params.data_source, &params.table).await?)?
        }
        other => return Err(ApiError::invalid(format!("unknown method: {other}"))),
    };
    Ok(value)
}
