//! CLI handler for the `plan` subcommand

use crate::cli::{load_config, PlanArgs};
use crate::output::{render_plan_pdf, DEFAULT_REPORT_TITLE};
use crate::planner::Planner;
use crate::provider::create_model;
use crate::tracker::create_trackers;
use anyhow::{bail, Context};
use std::path::Path;
use tracing::info;

pub async fn execute(args: PlanArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let goal = args.goal.trim();
    if goal.is_empty() {
        bail!("Goal must not be empty");
    }

    let config = load_config(config_path)?;
    let trackers = if args.no_issues {
        Vec::new()
    } else {
        create_trackers(&config)
    };
    let planner = Planner::from_config(&config, create_model(&config), trackers);

    let outcome = planner.plan(goal).await;

    if let Some(path) = &args.pdf {
        let bytes = render_plan_pdf(&outcome.tasks, DEFAULT_REPORT_TITLE)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote report to {}", path.display());
    }

    let response = outcome.into_response();
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
