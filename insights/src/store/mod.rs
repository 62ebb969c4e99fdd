//! Document storage behind the Insights endpoints.
//!
//! `DocumentStore` is the narrow surface the endpoints need: list projected rows of a
//! doctype, fetch one document, create a new unsaved document and save it. Backends
//! only supply `documents`, `get` and `save`; filtering, projection, ordering and the
//! flattening of child tables live in the default `list`.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use std::cmp::Ordering;

use chrono::Utc;
use serde_json::Value;

use crate::{
    errors::ApiError,
    types::{DocType, Document, Row},
};

/// Field selector meaning "every field".
pub const ALL_FIELDS: &str = "*";

/// Equality filter on a single row field. A missing field compares as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    #[inline]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.field).unwrap_or(&Value::Null) == &self.value
    }
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Every saved top-level document of `doctype`, in any order.
    async fn documents(&self, doctype: DocType) -> Result<Vec<Document>, ApiError>;

    async fn get(&self, doctype: DocType, name: &str) -> Result<Option<Document>, ApiError>;

    /// Insert or replace `doc`, stamping its `modified` time.
    async fn save(&self, doc: &mut Document) -> Result<(), ApiError>;

    /// Fresh, unsaved document of `doctype`.
    fn new_doc(&self, doctype: DocType) -> Document {
        Document::new(doctype)
    }

    /// Rows of `doctype` matching every filter, projected to `fields`.
    ///
    /// Top-level rows are ordered newest `modified` first. Child doctypes are flattened
    /// from their parents in that same parent order, then by `idx`.
    async fn list(&self, doctype: DocType, filters: &[FieldFilter], fields: &[&str]) -> Result<Vec<Row>, ApiError> {
        let rows: Vec<Row> = match doctype.parent() {
            Some((parent, child_field)) => newest_first(self.documents(parent).await?)
                .iter()
                .flat_map(|doc| doc.child_rows(child_field))
                .collect(),
            None => newest_first(self.documents(doctype).await?)
                .iter()
                .map(Document::to_row)
                .collect(),
        };

        Ok(rows
            .into_iter()
            .filter(|row| filters.iter().all(|filter| filter.matches(row)))
            .map(|row| project(row, fields))
            .collect())
    }
}

fn newest_first(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    docs
}

/// Keep only `fields`; absent fields are reported as `null`.
pub fn project(row: Row, fields: &[&str]) -> Row {
    if fields.is_empty() || fields.contains(&ALL_FIELDS) {
        return row;
    }
    fields
        .iter()
        .map(|field| (field.to_string(), row.get(*field).cloned().unwrap_or(Value::Null)))
        .collect()
}

/// Validates a document before a backend persists it and stamps `modified`.
pub(crate) fn prepare_save(doc: &mut Document) -> Result<(), ApiError> {
    if doc.doctype.is_child() {
        return Err(ApiError::invalid(format!(
            "{} rows are saved through their parent document",
            doc.doctype
        )));
    }
    if doc.name.trim().is_empty() {
        return Err(ApiError::invalid(format!("{} document has no name", doc.doctype)));
    }
    doc.modified = Utc::now();
    Ok(())
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn filter_treats_missing_field_as_null() {
        let sample = row(json!({"title": "Sales"}));
        assert!(FieldFilter::eq("status", Value::Null).matches(&sample));
        assert!(FieldFilter::eq("title", "Sales").matches(&sample));
        assert!(!FieldFilter::eq("title", "Ops").matches(&sample));
    }

    #[test]
    fn projection_keeps_only_requested_fields() {
        let projected = project(row(json!({"a": 1, "b": 2, "c": 3})), &["c", "z"]);
        assert_eq!(Value::Object(projected), json!({"c": 3, "z": null}));
    }

    #[test]
    fn star_projection_returns_everything() {
        let projected = project(row(json!({"a": 1, "b": 2})), &["a", ALL_FIELDS]);
        assert_eq!(projected.len(), 2);
    }

    #[test]
    fn child_documents_cannot_be_saved_directly() {
        let mut doc = Document::new(DocType::QueryTable);
        assert!(matches!(prepare_save(&mut doc), Err(ApiError::InvalidRequest { .. })));
    }

    #[test]
    fn values_order_by_kind_then_content() {
        assert_eq!(compare_values(&json!(null), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
    }
}
