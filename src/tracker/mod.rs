mod enrich;
mod github;
mod jira;

pub use enrich::Enricher;
pub use github::GitHubTracker;
pub use jira::JiraTracker;

use crate::config::Config;
use crate::error::TrackerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Which pair of task fields a tracker fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerKind {
    Jira,
    GitHub,
}

impl TrackerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerKind::Jira => "jira",
            TrackerKind::GitHub => "github",
        }
    }
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier and browser link of a created issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueRef {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn kind(&self) -> TrackerKind;

    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef, TrackerError>;
}

/// Build every tracker whose configuration is complete.
/// Incomplete ones are left out, so their task fields stay empty.
pub fn create_trackers(config: &Config) -> Vec<Arc<dyn IssueTracker>> {
    let mut trackers: Vec<Arc<dyn IssueTracker>> = Vec::new();

    if config.jira.enabled {
        match JiraTracker::from_config(&config.jira) {
            Some(jira) => {
                info!("Jira issue creation enabled for project {}", jira.project_key());
                trackers.push(Arc::new(jira));
            }
            None => warn!("Jira not configured (JIRA_SERVER/JIRA_EMAIL/JIRA_API_TOKEN/JIRA_PROJECT_KEY); skipping"),
        }
    }

    if config.github.enabled {
        match GitHubTracker::from_config(&config.github) {
            Some(github) => {
                info!("GitHub issue creation enabled for {}", github.repo());
                trackers.push(Arc::new(github));
            }
            None => warn!("GitHub not configured (GITHUB_TOKEN/GITHUB_REPO); skipping"),
        }
    }

    trackers
}
