//! Remote-callable Insights endpoints.
//!
//! Each endpoint validates its input and delegates to the injected document store, key
//! cache or query builder, returning the collaborator's result unchanged apart from typing.

use log::info;
use serde_json::Value;

use crate::{
    access::AccessPolicy,
    cache::KeyCache,
    capabilities::{self, MenuOptionSet, OperatorOption},
    errors::{ApiError, require_present},
    query::{Column, JoinOn, QueryBuilder, SortOrder},
    store::{DocumentStore, FieldFilter},
    types::{DashboardSummary, DataSourceSummary, DocType, QuerySummary, Row, TableRef, TableSummary, from_row},
};

/// Cache key prefix for per-data-source table listings.
pub const TABLES_CACHE_PREFIX: &str = "get_tables_";

const DATA_SOURCE_FIELDS: &[&str] = &["name", "title", "status", "database_type", "modified", "username"];
const TABLE_FIELDS: &[&str] = &["table", "label"];
const DASHBOARD_FIELDS: &[&str] = &["name", "title", "modified"];

pub fn tables_cache_key(data_source: &str) -> String {
    format!("{TABLES_CACHE_PREFIX}{data_source}")
}

pub struct InsightsApi<S, C> {
    store: S,
    cache: C,
    access: AccessPolicy,
}

impl<S, C> InsightsApi<S, C>
where
    S: DocumentStore,
    C: KeyCache,
{
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache,
            access: AccessPolicy::default(),
        }
    }

    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn get_app_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn get_operator_list(&self, fieldtype: Option<&str>) -> Vec<OperatorOption> {
        capabilities::resolve_operators(fieldtype)
    }

    pub fn get_column_menu_options(&self, fieldtype: &str) -> MenuOptionSet {
        capabilities::resolve_menu_options(fieldtype)
    }

    pub async fn get_data_sources(&self) -> Result<Vec<DataSourceSummary>, ApiError> {
        self.store
            .list(DocType::DataSource, &[], DATA_SOURCE_FIELDS)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Tables of `data_source`, cached per data source. No data source means no tables.
    pub async fn get_tables(&self, data_source: Option<&str>) -> Result<Vec<TableSummary>, ApiError> {
        let Some(data_source) = data_source.filter(|name| !name.is_empty()) else {
            return Ok(Vec::new());
        };

        let store = &self.store;
        self.cache
            .get_or_compute(&tables_cache_key(data_source), move || async move {
                store
                    .list(DocType::Table, &[FieldFilter::eq("data_source", data_source)], TABLE_FIELDS)
                    .await?
                    .into_iter()
                    .map(from_row)
                    .collect::<Result<Vec<TableSummary>, ApiError>>()
            })
            .await
    }

    pub async fn get_dashboard_list(&self) -> Result<Vec<DashboardSummary>, ApiError> {
        self.store
            .list(DocType::InsightsDashboard, &[], DASHBOARD_FIELDS)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Create a dashboard and return its generated name.
    pub async fn create_dashboard(&self, title: &str) -> Result<String, ApiError> {
        require_present([("title", title)])?;

        let mut dashboard = self.store.new_doc(DocType::InsightsDashboard);
        dashboard.set("title", title);
        self.store.save(&mut dashboard).await?;

        info!("created dashboard {} ({title})", dashboard.name);
        Ok(dashboard.name)
    }

    /// Saved queries, newest first, with the labels of their tables comma-joined.
    pub async fn get_queries(&self) -> Result<Vec<QuerySummary>, ApiError> {
        self.access.ensure_read(DocType::Query)?;

        QueryBuilder::new(DocType::Query)
            .left_join(DocType::QueryTable, JoinOn::new("name", "parent"))
            .select([
                Column::field(DocType::Query, "name"),
                Column::field(DocType::Query, "title"),
                Column::group_concat(DocType::QueryTable, "label").alias("tables"),
                Column::field(DocType::Query, "data_source"),
                Column::field(DocType::Query, "modified"),
            ])
            .group_by(DocType::Query, "name")
            .order_by(DocType::Query, "modified", SortOrder::Desc)
            .run(&self.store)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Create a query over one starting table and return its generated name.
    pub async fn create_query(&self, title: &str, data_source: &str, table: &TableRef) -> Result<String, ApiError> {
        require_present([("title", title), ("data_source", data_source), ("table", table.value.as_str())])?;

        let mut query = self.store.new_doc(DocType::Query);
        query.set("title", title).set("data_source", data_source);

        let mut row = Row::new();
        row.insert("table".to_string(), Value::String(table.value.clone()));
        row.insert("label".to_string(), table.label.clone().map(Value::String).unwrap_or(Value::Null));
        query.append("tables", row);

        self.store.save(&mut query).await?;

        info!("created query {} on {data_source}.{}", query.name, table.value);
        Ok(query.name)
    }
}
