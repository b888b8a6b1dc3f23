//! CLI handler for the `report` subcommand

use crate::cli::ReportArgs;
use crate::output::render_plan_pdf;
use crate::parser::parse_task_list;
use anyhow::Context;
use tracing::info;

pub fn execute(args: ReportArgs) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let tasks = parse_task_list(&content)
        .with_context(|| format!("No tasks found in {}", args.input.display()))?;

    let bytes = render_plan_pdf(&tasks, &args.title)?;
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!("Wrote {} tasks to {}", tasks.len(), args.output.display());
    println!("{}", args.output.display());
    Ok(())
}
