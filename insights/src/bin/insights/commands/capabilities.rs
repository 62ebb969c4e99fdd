use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::{
    context::Site,
    examples::ExampleGroup,
    output::OutputManager,
    views::{MenuOptions, OperatorList},
};

pub const OPERATOR_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Filter Operators",
    commands: &[
        "insights operators varchar          # Text operators after equals / not equals / is",
        "insights operators BIGINT           # Field types are case-insensitive",
        "insights operators                  # Only the universal operators",
    ],
}];

pub const MENU_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Column Menu",
    commands: &[
        "insights menu-options datetime      # Temporal aggregations and 12 datetime formats",
        "insights menu-options date --output json",
    ],
}];

#[derive(Args)]
pub struct OperatorsArgs {
    /// Column storage type, e.g. varchar, int, datetime
    pub fieldtype: Option<String>,
}

#[derive(Args)]
pub struct MenuOptionsArgs {
    /// Column storage type, e.g. varchar, int, datetime
    pub fieldtype: String,
}

pub async fn handle_operators(args: OperatorsArgs, site: &Site, output: &OutputManager) -> Result<()> {
    let operators: OperatorList = site
        .call_typed("get_operator_list", json!({ "fieldtype": args.fieldtype }))
        .await?;

    output.heading(&format!("Operators for {}", args.fieldtype.as_deref().unwrap_or("any type")));
    output.display(&operators)
}

pub async fn handle_menu_options(args: MenuOptionsArgs, site: &Site, output: &OutputManager) -> Result<()> {
    let menu: MenuOptions = site
        .call_typed("get_column_menu_options", json!({ "fieldtype": args.fieldtype }))
        .await?;

    output.heading(&format!("Column menu for {}", args.fieldtype));
    output.display(&menu)
}
