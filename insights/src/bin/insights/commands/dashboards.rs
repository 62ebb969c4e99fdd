use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::{
    commands::note_ephemeral,
    context::Site,
    examples::ExampleGroup,
    output::OutputManager,
    views::{Created, DashboardList},
};

pub const LIST_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Dashboards",
    commands: &["insights dashboards                         # Newest first"],
}];

pub const CREATE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Create Dashboard",
    commands: &[
        "insights create-dashboard \"Sales Overview\"",
        "insights create-dashboard Ops --output compact   # Print only the new name",
    ],
}];

#[derive(Args)]
pub struct CreateDashboardArgs {
    /// Dashboard title
    pub title: String,
}

pub async fn handle_list(site: &Site, output: &OutputManager) -> Result<()> {
    let dashboards: DashboardList = site.call_typed("get_dashboard_list", json!({})).await?;

    output.heading("Dashboards");
    output.display(&dashboards)
}

pub async fn handle_create(args: CreateDashboardArgs, site: &Site, output: &OutputManager) -> Result<()> {
    let name: String = site
        .call_typed("create_dashboard", json!({ "title": args.title }))
        .await?;

    output.success(&format!("Created dashboard '{}'", args.title));
    note_ephemeral(site, output);
    output.display(&Created {
        doctype: "Insights Dashboard".to_string(),
        name,
    })
}
