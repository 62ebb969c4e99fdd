use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::{
    commands::note_ephemeral,
    context::Site,
    examples::ExampleGroup,
    output::OutputManager,
    views::{Created, QueryList},
};

pub const LIST_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Saved Queries",
    commands: &[
        "insights queries                            # Newest first, with table labels",
        "insights queries --output json",
    ],
}];

pub const CREATE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Create Query",
    commands: &[
        "insights create-query \"Monthly Revenue\" --data-source demo_db --table orders --label Orders",
    ],
}];

#[derive(Args)]
pub struct CreateQueryArgs {
    /// Query title
    pub title: String,

    /// Data source the query runs against
    #[arg(long)]
    pub data_source: String,

    /// Starting table
    #[arg(long)]
    pub table: String,

    /// Display label of the starting table
    #[arg(long)]
    pub label: Option<String>,
}

pub async fn handle_list(site: &Site, output: &OutputManager) -> Result<()> {
    let queries: QueryList = site.call_typed("get_queries", json!({})).await?;

    output.heading("Saved Queries");
    output.display(&queries)
}

pub async fn handle_create(args: CreateQueryArgs, site: &Site, output: &OutputManager) -> Result<()> {
    let params = json!({
        "title": args.title,
        "data_source": args.data_source,
        "table": { "value": args.table, "label": args.label },
    });
    let name: String = site.call_typed("create_query", params).await?;

    output.success(&format!("Created query '{}' on {}", args.title, args.data_source));
    note_ephemeral(site, output);
    output.display(&Created {
        doctype: "Query".to_string(),
        name,
    })
}
