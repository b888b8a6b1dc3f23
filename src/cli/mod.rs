pub mod plan;
pub mod report;
pub mod schema;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "planagent")]
#[command(
    author,
    version,
    about = "Turns product goals into task plans with Gemini, Jira and GitHub"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: planagent.yaml if present)
    #[arg(short, long, global = true, env = "PLANAGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Plan a single goal and print the result as JSON
    Plan(PlanArgs),

    /// Render a PDF report from a saved task list
    Report(ReportArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct ServeArgs {
    /// Override bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override bind port
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Parser, Clone)]
pub struct PlanArgs {
    /// Product goal to break down
    #[arg(short, long)]
    pub goal: String,

    /// Skip Jira/GitHub issue creation
    #[arg(long)]
    pub no_issues: bool,

    /// Also write the plan as a PDF
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ReportArgs {
    /// JSON file with a task array or a `{"tasks": [...]}` object
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the PDF
    #[arg(short, long)]
    pub output: PathBuf,

    /// Report title
    #[arg(long, default_value = crate::output::DEFAULT_REPORT_TITLE)]
    pub title: String,
}

/// Resolve and validate configuration for commands that need it
pub fn load_config(cli_path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = Config::resolve(cli_path)?;
    config.validate()?;
    Ok(config)
}
