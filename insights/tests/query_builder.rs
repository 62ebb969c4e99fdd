//! Joins, grouping and ordering evaluated over the memory store.

use chrono::{TimeZone, Utc};
use insights::{Column, DocType, Document, JoinOn, MemoryStore, QueryBuilder, Row, SortOrder};
use serde_json::{Value, json};

fn query(name: &str, day: u32, source: Option<&str>, labels: &[Option<&str>]) -> Document {
    let mut doc = Document::with_name(DocType::Query, name);
    doc.modified = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
    doc.set("title", name.to_uppercase());
    if let Some(source) = source {
        doc.set("data_source", source);
    }
    for label in labels {
        let mut row = Row::new();
        row.insert("label".to_string(), label.map(Value::from).unwrap_or(Value::Null));
        doc.append("tables", row);
    }
    doc
}

fn store() -> MemoryStore {
    MemoryStore::with_documents([
        query("alpha", 1, Some("shop"), &[Some("Orders"), None, Some("Items")]),
        query("beta", 3, None, &[Some("Leads")]),
        query("gamma", 2, Some("crm"), &[]),
    ])
}

fn names(rows: &[Row]) -> Vec<&str> {
    rows.iter().filter_map(|row| row.get("name").and_then(Value::as_str)).collect()
}

#[tokio::test]
async fn left_join_without_group_yields_one_row_per_match() {
    let rows = QueryBuilder::new(DocType::Query)
        .left_join(DocType::QueryTable, JoinOn::new("name", "parent"))
        .select([Column::field(DocType::Query, "name"), Column::field(DocType::QueryTable, "idx")])
        .run(&store())
        .await
        .unwrap();

    // base rows arrive newest first, joined rows in idx order
    assert_eq!(names(&rows), ["beta", "gamma", "alpha", "alpha", "alpha"]);
    assert_eq!(rows[1]["idx"], Value::Null);
    let alpha_idx: Vec<&Value> = rows[2..].iter().map(|row| &row["idx"]).collect();
    assert_eq!(alpha_idx, [&json!(1), &json!(2), &json!(3)]);
}

#[tokio::test]
async fn group_concat_skips_null_labels() {
    let rows = QueryBuilder::new(DocType::Query)
        .left_join(DocType::QueryTable, JoinOn::new("name", "parent"))
        .select([
            Column::field(DocType::Query, "name"),
            Column::group_concat(DocType::QueryTable, "label").alias("tables"),
        ])
        .group_by(DocType::Query, "name")
        .order_by(DocType::Query, "name", SortOrder::Asc)
        .run(&store())
        .await
        .unwrap();

    assert_eq!(names(&rows), ["alpha", "beta", "gamma"]);
    assert_eq!(rows[0]["tables"], json!("Orders,Items"));
    assert_eq!(rows[1]["tables"], json!("Leads"));
    assert_eq!(rows[2]["tables"], Value::Null);
}

#[tokio::test]
async fn ordering_keys_apply_in_sequence() {
    let rows = QueryBuilder::new(DocType::Query)
        .select([Column::field(DocType::Query, "name"), Column::field(DocType::Query, "data_source")])
        .order_by(DocType::Query, "data_source", SortOrder::Desc)
        .order_by(DocType::Query, "name", SortOrder::Asc)
        .run(&store())
        .await
        .unwrap();

    // null sorts lowest, so it comes last in descending order
    assert_eq!(names(&rows), ["alpha", "gamma", "beta"]);
    assert_eq!(rows[2]["data_source"], Value::Null);
}

#[tokio::test]
async fn aliased_plain_columns_rename_output() {
    let rows = QueryBuilder::new(DocType::Query)
        .select([Column::field(DocType::Query, "title").alias("heading")])
        .order_by(DocType::Query, "modified", SortOrder::Asc)
        .run(&store())
        .await
        .unwrap();

    let headings: Vec<&Value> = rows.iter().map(|row| &row["heading"]).collect();
    assert_eq!(headings, [&json!("ALPHA"), &json!("GAMMA"), &json!("BETA")]);
    assert!(rows.iter().all(|row| row.len() == 1));
}

#[tokio::test]
async fn columns_outside_the_query_are_rejected() {
    let err = QueryBuilder::new(DocType::Query)
        .select([Column::field(DocType::Table, "label")])
        .run(&store())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is not part of a query on Query"));

    let err = QueryBuilder::new(DocType::Query).run(&store()).await.unwrap_err();
    assert!(err.to_string().contains("selects no columns"));
}
