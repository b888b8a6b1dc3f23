use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod error;
mod output;
mod parser;
mod planner;
mod provider;
mod server;
#[cfg(test)]
mod testutil;
mod tracker;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_filter = if cli.verbose {
        "planagent=debug"
    } else {
        "planagent=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config_path).await,
        Commands::Plan(args) => cli::plan::execute(args, config_path).await,
        Commands::Report(args) => cli::report::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
