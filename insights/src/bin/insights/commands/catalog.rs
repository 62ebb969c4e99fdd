use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::{
    context::Site,
    examples::ExampleGroup,
    output::OutputManager,
    views::{DataSourceList, TableList},
};

pub const DATA_SOURCE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Data Sources",
    commands: &[
        "insights data-sources                       # Newest first",
        "insights --seed demo.json data-sources      # Against a seeded memory backend",
    ],
}];

pub const TABLE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Tables",
    commands: &[
        "insights tables demo_db                     # Tables of one data source",
        "insights tables demo_db --output compact    # Comma-separated table names",
    ],
}];

#[derive(Args)]
pub struct TablesArgs {
    /// Data source name (no data source lists nothing)
    pub data_source: Option<String>,
}

pub async fn handle_data_sources(site: &Site, output: &OutputManager) -> Result<()> {
    let sources: DataSourceList = site.call_typed("get_data_sources", json!({})).await?;

    output.heading("Data Sources");
    output.display(&sources)
}

pub async fn handle_tables(args: TablesArgs, site: &Site, output: &OutputManager) -> Result<()> {
    if args.data_source.is_none() {
        output.info("No data source given; pass one to list its tables.");
    }

    let tables: TableList = site
        .call_typed("get_tables", json!({ "data_source": args.data_source }))
        .await?;

    output.heading(&format!("Tables of {}", args.data_source.as_deref().unwrap_or("-")));
    output.display(&tables)
}
