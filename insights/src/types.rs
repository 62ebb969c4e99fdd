use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{errors::ApiError, id::generate_document_name};

/// A flat JSON projection of a document or child row.
pub type Row = Map<String, Value>;

pub const NAME_FIELD: &str = "name";
pub const MODIFIED_FIELD: &str = "modified";
pub const PARENT_FIELD: &str = "parent";
pub const PARENTTYPE_FIELD: &str = "parenttype";
pub const PARENTFIELD_FIELD: &str = "parentfield";
pub const IDX_FIELD: &str = "idx";

/// Document types known to the Insights site.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "Data Source")]
    DataSource,
    #[serde(rename = "Table")]
    Table,
    #[serde(rename = "Insights Dashboard")]
    InsightsDashboard,
    #[serde(rename = "Query")]
    Query,
    #[serde(rename = "Query Table")]
    QueryTable,
}

impl DocType {
    pub const ALL: [DocType; 5] = [
        DocType::DataSource,
        DocType::Table,
        DocType::InsightsDashboard,
        DocType::Query,
        DocType::QueryTable,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DocType::DataSource => "Data Source",
            DocType::Table => "Table",
            DocType::InsightsDashboard => "Insights Dashboard",
            DocType::Query => "Query",
            DocType::QueryTable => "Query Table",
        }
    }

    /// Lowercase key segment used by the Redis store.
    pub const fn slug(self) -> &'static str {
        match self {
            DocType::DataSource => "data_source",
            DocType::Table => "table",
            DocType::InsightsDashboard => "insights_dashboard",
            DocType::Query => "query",
            DocType::QueryTable => "query_table",
        }
    }

    /// Parent doctype and child field for child tables.
    pub const fn parent(self) -> Option<(DocType, &'static str)> {
        match self {
            DocType::QueryTable => Some((DocType::Query, "tables")),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_child(self) -> bool {
        self.parent().is_some()
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|doctype| doctype.as_str().eq_ignore_ascii_case(value) || doctype.slug() == value)
            .ok_or_else(|| ApiError::invalid(format!("unknown doctype: {value}")))
    }
}

/// Fixed-width RFC 3339 rendering so timestamps sort lexically.
pub fn format_modified(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A stored record: named, typed, with free-form fields and ordered child tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doctype: DocType,
    #[serde(default = "generate_document_name")]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub fields: Row,
    #[serde(default)]
    pub children: BTreeMap<String, Vec<Row>>,
}

impl Document {
    /// Unsaved document with a generated name.
    pub fn new(doctype: DocType) -> Self {
        Self {
            doctype,
            name: generate_document_name(),
            modified: Utc::now(),
            fields: Row::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_name(doctype: DocType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new(doctype)
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Append a row to a child table, assigning its name and 1-based `idx`.
    pub fn append(&mut self, child_field: impl Into<String>, mut row: Row) -> &mut Self {
        let rows = self.children.entry(child_field.into()).or_default();
        row.insert(NAME_FIELD.to_string(), Value::String(generate_document_name()));
        row.insert(IDX_FIELD.to_string(), Value::from(rows.len() + 1));
        rows.push(row);
        self
    }

    /// Top-level projection: `name`, `modified` and every field.
    pub fn to_row(&self) -> Row {
        let mut row = self.fields.clone();
        row.insert(NAME_FIELD.to_string(), Value::String(self.name.clone()));
        row.insert(MODIFIED_FIELD.to_string(), Value::String(format_modified(self.modified)));
        row
    }

    /// Child rows of `child_field`, linked back to this document.
    pub fn child_rows(&self, child_field: &str) -> Vec<Row> {
        let Some(rows) = self.children.get(child_field) else {
            return Vec::new();
        };
        rows.iter()
            .map(|row| {
                let mut row = row.clone();
                row.insert(PARENT_FIELD.to_string(), Value::String(self.name.clone()));
                row.insert(PARENTTYPE_FIELD.to_string(), Value::String(self.doctype.as_str().to_string()));
                row.insert(PARENTFIELD_FIELD.to_string(), Value::String(child_field.to_string()));
                row.insert(MODIFIED_FIELD.to_string(), Value::String(format_modified(self.modified)));
                row
            })
            .collect()
    }
}

/// Data source listing entry.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSummary {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub database_type: Option<String>,
    pub modified: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Table listing entry for one data source.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub modified: String,
}

/// Saved query listing entry; `tables` concatenates the labels of its tables.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tables: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    pub modified: String,
}

/// Table picked in the query editor when a query is created.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Decode a projected row into a typed summary.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, ApiError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn doctype_parses_display_name_and_slug() {
        assert_eq!("Query Table".parse::<DocType>().unwrap(), DocType::QueryTable);
        assert_eq!("insights_dashboard".parse::<DocType>().unwrap(), DocType::InsightsDashboard);
        assert!("Report".parse::<DocType>().is_err());
    }

    #[test]
    fn doctype_serializes_as_display_name() {
        assert_eq!(serde_json::to_value(DocType::DataSource).unwrap(), json!("Data Source"));
    }

    #[test]
    fn child_rows_carry_parent_links_and_idx() {
        let mut query = Document::with_name(DocType::Query, "q1");
        let mut first = Row::new();
        first.insert("label".into(), json!("Orders"));
        let mut second = Row::new();
        second.insert("label".into(), json!("Customers"));
        query.append("tables", first).append("tables", second);

        let rows = query.child_rows("tables");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["idx"], json!(2));
        assert_eq!(rows[1]["parent"], json!("q1"));
        assert_eq!(rows[1]["parenttype"], json!("Query"));
        assert!(query.child_rows("charts").is_empty());
    }

    #[test]
    fn to_row_includes_reserved_fields() {
        let mut dashboard = Document::with_name(DocType::InsightsDashboard, "d1");
        dashboard.set("title", "Sales");
        let row = dashboard.to_row();
        assert_eq!(row["name"], json!("d1"));
        assert_eq!(row["title"], json!("Sales"));
        assert!(row["modified"].as_str().unwrap().ends_with('Z'));
    }
}
