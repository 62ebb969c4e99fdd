//! Renderable wrappers around endpoint results.

use comfy_table::{Cell, Table};
use insights::{DashboardSummary, DataSourceSummary, MenuOptionSet, OperatorOption, QuerySummary, TableSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::output::{GlobalOptions, TableDisplay, themed_table};

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn empty_row(table: &mut Table, message: &str) {
    table.add_row(vec![Cell::new(message)]);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorList(pub Vec<OperatorOption>);

impl TableDisplay for OperatorList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Label", "Value"]);
        for option in &self.0 {
            table.add_row(vec![Cell::new(&option.label), Cell::new(&option.value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().map(|option| option.value.as_str()).collect::<Vec<_>>().join(",")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuOptions(pub MenuOptionSet);

impl TableDisplay for MenuOptions {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Kind", "Label", "Value"]);
        if self.0.is_empty() {
            empty_row(&mut table, "No menu options for this field type");
            return table;
        }
        let rows = self
            .0
            .aggregation_options
            .iter()
            .map(|option| ("aggregation", option))
            .chain(self.0.format_options.iter().map(|option| ("format", option)));
        for (kind, option) in rows {
            table.add_row(vec![Cell::new(kind), Cell::new(&option.label), Cell::new(&option.value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let values = |options: &[OperatorOption]| options.iter().map(|o| o.value.as_str()).collect::<Vec<_>>().join(",");
        format!(
            "aggregations={} formats={}",
            values(&self.0.aggregation_options),
            values(&self.0.format_options)
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceList(pub Vec<DataSourceSummary>);

impl TableDisplay for DataSourceList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Name", "Title", "Status", "Database", "User", "Modified"]);
        if self.0.is_empty() {
            empty_row(&mut table, "No data sources found");
        }
        for source in &self.0 {
            table.add_row(vec![
                Cell::new(&source.name),
                Cell::new(text(&source.title)),
                Cell::new(text(&source.status)),
                Cell::new(text(&source.database_type)),
                Cell::new(text(&source.username)),
                Cell::new(&source.modified),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Count: {}", self.0.len())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableList(pub Vec<TableSummary>);

impl TableDisplay for TableList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Table", "Label"]);
        if self.0.is_empty() {
            empty_row(&mut table, "No tables found");
        }
        for entry in &self.0 {
            table.add_row(vec![Cell::new(text(&entry.table)), Cell::new(text(&entry.label))]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().filter_map(|entry| entry.table.as_deref()).collect::<Vec<_>>().join(",")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardList(pub Vec<DashboardSummary>);

impl TableDisplay for DashboardList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Name", "Title", "Modified"]);
        if self.0.is_empty() {
            empty_row(&mut table, "No dashboards found");
        }
        for dashboard in &self.0 {
            table.add_row(vec![
                Cell::new(&dashboard.name),
                Cell::new(text(&dashboard.title)),
                Cell::new(&dashboard.modified),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Count: {}", self.0.len())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryList(pub Vec<QuerySummary>);

impl TableDisplay for QueryList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Name", "Title", "Tables", "Data Source", "Modified"]);
        if self.0.is_empty() {
            empty_row(&mut table, "No queries found");
        }
        for query in &self.0 {
            table.add_row(vec![
                Cell::new(&query.name),
                Cell::new(text(&query.title)),
                Cell::new(text(&query.tables)),
                Cell::new(text(&query.data_source)),
                Cell::new(&query.modified),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Count: {}", self.0.len())
    }
}

/// Name of a newly created document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub doctype: String,
    pub name: String,
}

impl TableDisplay for Created {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Doctype", "Name"]);
        table.add_row(vec![Cell::new(&self.doctype), Cell::new(&self.name)]);
        table
    }

    fn to_compact(&self) -> String {
        self.name.clone()
    }
}

/// Raw result of a dispatched call.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawValue(pub Value);

impl TableDisplay for RawValue {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Result"]);
        let rendered = serde_json::to_string_pretty(&self.0).unwrap_or_default();
        table.add_row(vec![Cell::new(rendered)]);
        table
    }

    fn to_compact(&self) -> String {
        self.0.to_string()
    }
}
