//! Small relational query builder evaluated over a [`DocumentStore`].
//!
//! Covers the shape the endpoints need: one base doctype, an optional left join, plain
//! and `GROUP_CONCAT` columns, grouping and ordering.
//!
//! ```text
//! QueryBuilder::new(DocType::Query)
//!     .left_join(DocType::QueryTable, JoinOn::new("name", "parent"))
//!     .select([
//!         Column::field(DocType::Query, "name"),
//!         Column::group_concat(DocType::QueryTable, "label").alias("tables"),
//!     ])
//!     .group_by(DocType::Query, "name")
//!     .order_by(DocType::Query, "modified", SortOrder::Desc)
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{
    errors::ApiError,
    store::{DocumentStore, compare_values},
    types::{DocType, Row},
};

const GROUP_CONCAT_SEPARATOR: &str = ",";

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A field qualified by the doctype it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub doctype: DocType,
    pub field: String,
}

impl FieldRef {
    pub fn new(doctype: DocType, field: impl Into<String>) -> Self {
        Self {
            doctype,
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Field { source: FieldRef, alias: Option<String> },
    GroupConcat { source: FieldRef, alias: Option<String> },
}

impl Column {
    #[inline]
    pub fn field(doctype: DocType, field: impl Into<String>) -> Self {
        Self::Field {
            source: FieldRef::new(doctype, field),
            alias: None,
        }
    }

    #[inline]
    pub fn group_concat(doctype: DocType, field: impl Into<String>) -> Self {
        Self::GroupConcat {
            source: FieldRef::new(doctype, field),
            alias: None,
        }
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        match self {
            Self::Field { source, .. } => Self::Field {
                source,
                alias: Some(name.into()),
            },
            Self::GroupConcat { source, .. } => Self::GroupConcat {
                source,
                alias: Some(name.into()),
            },
        }
    }

    fn source(&self) -> &FieldRef {
        match self {
            Self::Field { source, .. } | Self::GroupConcat { source, .. } => source,
        }
    }

    /// Key of the column in result rows: the alias, else the bare field name.
    pub fn output_name(&self) -> &str {
        match self {
            Self::Field { source, alias } | Self::GroupConcat { source, alias } => {
                alias.as_deref().unwrap_or(&source.field)
            }
        }
    }
}

/// `base.left = joined.right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOn {
    pub left: String,
    pub right: String,
}

impl JoinOn {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    doctype: DocType,
    on: JoinOn,
}

/// One base row paired with at most one joined row.
struct JoinedRow<'a> {
    base: &'a Row,
    joined: Option<&'a Row>,
}

impl JoinedRow<'_> {
    fn value(&self, from: DocType, source: &FieldRef) -> Value {
        let row = if source.doctype == from {
            Some(self.base)
        } else {
            self.joined
        };
        row.and_then(|row| row.get(&source.field)).cloned().unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    from: DocType,
    join: Option<Join>,
    columns: Vec<Column>,
    group_by: Option<FieldRef>,
    order_by: Vec<(FieldRef, SortOrder)>,
}

impl QueryBuilder {
    pub fn new(from: DocType) -> Self {
        Self {
            from,
            join: None,
            columns: Vec::new(),
            group_by: None,
            order_by: Vec::new(),
        }
    }

    #[inline]
    pub fn left_join(mut self, doctype: DocType, on: JoinOn) -> Self {
        self.join = Some(Join { doctype, on });
        self
    }

    #[inline]
    pub fn select(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    #[inline]
    pub fn group_by(mut self, doctype: DocType, field: impl Into<String>) -> Self {
        self.group_by = Some(FieldRef::new(doctype, field));
        self
    }

    /// Add a sort key; keys apply in the order they were added.
    #[inline]
    pub fn order_by(mut self, doctype: DocType, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by.push((FieldRef::new(doctype, field), order));
        self
    }

    fn check_source(&self, source: &FieldRef) -> Result<(), ApiError> {
        let joined = self.join.as_ref().map(|join| join.doctype);
        if source.doctype == self.from || Some(source.doctype) == joined {
            Ok(())
        } else {
            Err(ApiError::invalid(format!(
                "{}.{} is not part of a query on {}",
                source.doctype, source.field, self.from
            )))
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.columns.is_empty() {
            return Err(ApiError::invalid("query selects no columns"));
        }
        for column in &self.columns {
            self.check_source(column.source())?;
        }
        if let Some(group) = &self.group_by {
            self.check_source(group)?;
        }
        for (source, _) in &self.order_by {
            self.check_source(source)?;
        }
        Ok(())
    }

    /// Evaluate against `store`, returning one row per group keyed by column output names.
    pub async fn run<S: DocumentStore>(&self, store: &S) -> Result<Vec<Row>, ApiError> {
        self.validate()?;

        let base_rows = store.list(self.from, &[], &[]).await?;
        let joined_rows = match &self.join {
            Some(join) => store.list(join.doctype, &[], &[]).await?,
            None => Vec::new(),
        };

        let mut combined = Vec::with_capacity(base_rows.len());
        for base in &base_rows {
            let Some(join) = &self.join else {
                combined.push(JoinedRow { base, joined: None });
                continue;
            };
            let key = base.get(&join.on.left).unwrap_or(&Value::Null);
            let mut matched = false;
            if !key.is_null() {
                for joined in joined_rows.iter().filter(|row| row.get(&join.on.right) == Some(key)) {
                    combined.push(JoinedRow {
                        base,
                        joined: Some(joined),
                    });
                    matched = true;
                }
            }
            if !matched {
                combined.push(JoinedRow { base, joined: None });
            }
        }

        let mut groups = self.group(combined);

        if !self.order_by.is_empty() {
            groups.sort_by(|a, b| {
                self.order_by
                    .iter()
                    .map(|(source, order)| {
                        let ordering = compare_values(&a[0].value(self.from, source), &b[0].value(self.from, source));
                        match order {
                            SortOrder::Asc => ordering,
                            SortOrder::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(groups.iter().map(|group| self.project(group)).collect())
    }

    /// Groups in first-appearance order; every row is its own group without `group_by`.
    fn group<'a>(&self, rows: Vec<JoinedRow<'a>>) -> Vec<Vec<JoinedRow<'a>>> {
        let Some(group_by) = &self.group_by else {
            return rows.into_iter().map(|row| vec![row]).collect();
        };

        let mut groups: Vec<Vec<JoinedRow<'a>>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let key = row.value(self.from, group_by).to_string();
            match index.get(&key) {
                Some(&position) => groups[position].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }
        groups
    }

    fn project(&self, group: &[JoinedRow<'_>]) -> Row {
        let mut row = Row::new();
        for column in &self.columns {
            let value = match column {
                Column::Field { source, .. } => group[0].value(self.from, source),
                Column::GroupConcat { source, .. } => group_concat(group.iter().map(|r| r.value(self.from, source))),
            };
            row.insert(column.output_name().to_string(), value);
        }
        row
    }
}

/// `GROUP_CONCAT`: non-null values joined by `,`, `null` when every value is null.
fn group_concat(values: impl Iterator<Item = Value>) -> Value {
    let parts: Vec<String> = values
        .filter(|value| !value.is_null())
        .map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();

    if parts.is_empty() {
        Value::Null
    } else {
        Value::String(parts.join(GROUP_CONCAT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_concat_skips_nulls() {
        let values = vec![json!("Orders"), Value::Null, json!(3)];
        assert_eq!(group_concat(values.into_iter()), json!("Orders,3"));
        assert_eq!(group_concat(std::iter::once(Value::Null)), Value::Null);
    }

    #[test]
    fn alias_replaces_output_name() {
        let column = Column::group_concat(DocType::QueryTable, "label").alias("tables");
        assert_eq!(column.output_name(), "tables");
        assert_eq!(Column::field(DocType::Query, "title").output_name(), "title");
    }
}
