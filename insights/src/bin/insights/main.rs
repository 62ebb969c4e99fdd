mod commands;
mod context;
mod examples;
mod output;
mod theme;
mod views;

use std::fmt::Write;
use std::io::{self, Write as IoWrite};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};

use commands::{
    call::{CallArgs, handle_call},
    capabilities::{MenuOptionsArgs, OperatorsArgs, handle_menu_options, handle_operators},
    catalog::{TablesArgs, handle_data_sources, handle_tables},
    dashboards::{self, CreateDashboardArgs},
    queries::{self, CreateQueryArgs},
};
use context::SiteContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("INSIGHTS_CONFIG", "Path to the site config file (overrides discovery)"),
    ("REDIS_URL", "Redis connection URL for the redis backend"),
    ("RUST_LOG", "Log filter, e.g. insights=debug"),
];

#[derive(Parser)]
#[command(name = "insights")]
#[command(version)]
#[command(
    about = "Query the Insights API from the command line",
    long_about = r#"Command line front end for the Insights API:

• Filter operators and column menu options per field type
• Data sources, their tables, dashboards and saved queries
• Name-based dispatch of any API method with JSON arguments

The backend (memory or redis) is chosen in .insights/config.toml.
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Site config file
    #[arg(long, env = "INSIGHTS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// JSON file of documents to load into the memory backend
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Parse arguments with themed help; usage errors exit with clap's code.
fn parse_cli() -> Cli {
    let use_color = detect_color_support();
    let mut command = Cli::command()
        .styles(theme::help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(render_environment(use_color));

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups, use_color));
        }
    }

    let matches = command.get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", paint("Examples:", THEME.highlight, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", paint(group.title, THEME.primary, true, use_color));
        for command in group.commands {
            let arrow = paint(ICONS.arrow, THEME.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {}", paint(command, THEME.secondary, false, use_color));
        }
    }

    buffer
}

fn render_environment(use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", paint("Environment Variables:", THEME.highlight, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            buffer,
            "  {}  {}",
            paint(key, THEME.key, true, use_color),
            paint(description, THEME.value, false, use_color)
        );
    }

    let _ = writeln!(
        buffer,
        "\n{} {}",
        paint("Tip:", THEME.highlight, true, use_color),
        paint("Use 'insights <command> --help' for examples.", THEME.secondary, false, use_color)
    );
    buffer
}

fn paint(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => text.color(color).to_string(),
        (true, true) => text.color(color).bold().to_string(),
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn print_blank_line() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\n").and_then(|()| stdout.flush());
}

#[derive(Subcommand)]
enum Commands {
    /// Filter operators offered for a field type
    Operators(OperatorsArgs),

    /// Aggregation and format options of the column menu for a field type
    MenuOptions(MenuOptionsArgs),

    /// List data sources
    DataSources,

    /// List the tables of a data source
    Tables(TablesArgs),

    /// List dashboards
    Dashboards,

    /// Create a dashboard
    CreateDashboard(CreateDashboardArgs),

    /// List saved queries with the labels of their tables
    Queries,

    /// Create a query starting from one table
    CreateQuery(CreateQueryArgs),

    /// Dispatch an API method by name with JSON arguments
    Call(CallArgs),

    /// Show the API version
    Version,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "insights=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

#[tokio::main]
async fn main() {
    let cli = parse_cli();

    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    print_blank_line();
    let result = execute(cli).await;
    print_blank_line();

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);

    let ctx = SiteContext::load(cli.config.as_deref())?;
    match &ctx.config_path {
        Some(path) => output.verbose(&format!("using config {}", path.display())),
        None => output.verbose("no config file found; using defaults"),
    }

    let site = ctx.connect(cli.seed.as_deref(), &output).await?;

    match cli.command {
        Commands::Operators(args) => handle_operators(args, &site, &output).await?,
        Commands::MenuOptions(args) => handle_menu_options(args, &site, &output).await?,
        Commands::DataSources => handle_data_sources(&site, &output).await?,
        Commands::Tables(args) => handle_tables(args, &site, &output).await?,
        Commands::Dashboards => dashboards::handle_list(&site, &output).await?,
        Commands::CreateDashboard(args) => dashboards::handle_create(args, &site, &output).await?,
        Commands::Queries => queries::handle_list(&site, &output).await?,
        Commands::CreateQuery(args) => queries::handle_create(args, &site, &output).await?,
        Commands::Call(args) => handle_call(args, &site, &output).await?,
        Commands::Version => {
            let version: String = site.call_typed("get_app_version", serde_json::json!({})).await?;
            output.key_value("insights", &version);
            if output.is_json() {
                println!("{}", serde_json::json!({ "version": version }));
            }
        }
    }

    Ok(())
}
