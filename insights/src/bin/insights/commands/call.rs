use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::{context::Site, examples::ExampleGroup, output::OutputManager, views::RawValue};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Dispatch By Name",
        commands: &[
            "insights call list_methods",
            "insights call insights.api.get_operator_list --args '{\"fieldtype\": \"int\"}'",
            "insights call get_tables --args '{\"data_source\": \"demo_db\"}'",
        ],
    },
];

#[derive(Args)]
pub struct CallArgs {
    /// Method name, with or without the insights.api. prefix
    pub method: String,

    /// Keyword arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,
}

pub async fn handle_call(args: CallArgs, site: &Site, output: &OutputManager) -> Result<()> {
    let params: Value = serde_json::from_str(&args.args).context("--args must be a JSON object")?;
    output.verbose(&format!("dispatching {} with {params}", args.method));

    let result = site.call(&args.method, params).await?;
    output.display(&RawValue(result))
}
