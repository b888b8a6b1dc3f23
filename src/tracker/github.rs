use super::{IssueRef, IssueTracker, TrackerKind};
use crate::config::GithubConfig;
use crate::error::TrackerError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TRACKER: &str = "github";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Creates issues through the GitHub REST API
pub struct GitHubTracker {
    client: Client,
    api_base: String,
    token: String,
    repo: String,
}

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatedIssue {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct GitHubErrorBody {
    message: String,
}

impl GitHubTracker {
    /// `None` unless both token and owner/repo are set
    pub fn from_config(config: &GithubConfig) -> Option<Self> {
        let token = config.token.clone().filter(|t| !t.trim().is_empty())?;
        let repo = config
            .repo
            .clone()
            .map(|r| r.trim().trim_matches('/').to_string())
            .filter(|r| r.contains('/'))?;

        Some(Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            repo,
        })
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", self.api_base, self.repo)
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::GitHub
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef, TrackerError> {
        debug!("Creating GitHub issue in {}: {}", self.repo, title);

        let response = self
            .client
            .post(self.issues_url())
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, concat!("planagent/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&NewIssue { title, body })
            .send()
            .await
            .map_err(|source| TrackerError::Request {
                tracker: TRACKER,
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| TrackerError::Request {
            tracker: TRACKER,
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<GitHubErrorBody>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(TrackerError::Rejected {
                tracker: TRACKER,
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedIssue =
            serde_json::from_str(&text).map_err(|e| TrackerError::MalformedResponse {
                tracker: TRACKER,
                message: e.to_string(),
            })?;

        Ok(IssueRef {
            id: created.number.to_string(),
            url: created.html_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GithubConfig {
        GithubConfig {
            token: Some("ghp_test".to_string()),
            repo: Some("acme/widgets".to_string()),
            ..GithubConfig::default()
        }
    }

    #[test]
    fn test_requires_token_and_repo() {
        assert!(GitHubTracker::from_config(&config()).is_some());

        let mut no_token = config();
        no_token.token = Some(String::new());
        assert!(GitHubTracker::from_config(&no_token).is_none());

        let mut bad_repo = config();
        bad_repo.repo = Some("widgets".to_string());
        assert!(GitHubTracker::from_config(&bad_repo).is_none());
    }

    #[test]
    fn test_issues_url() {
        let mut cfg = config();
        cfg.api_base = "https://github.example.com/api/v3/".to_string();
        let tracker = GitHubTracker::from_config(&cfg).unwrap();
        assert_eq!(
            tracker.issues_url(),
            "https://github.example.com/api/v3/repos/acme/widgets/issues"
        );
    }

    #[test]
    fn test_created_issue_decoding() {
        let created: CreatedIssue = serde_json::from_str(
            r#"{"id": 1, "number": 42, "html_url": "https://github.com/acme/widgets/issues/42", "title": "x"}"#,
        )
        .unwrap();
        assert_eq!(created.number, 42);
        assert!(created.html_url.ends_with("/42"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let mut unreachable = config();
        unreachable.api_base = "http://127.0.0.1:9".to_string();
        let tracker = GitHubTracker::from_config(&unreachable).unwrap();
        let result = tracker.create_issue("t", "b").await;
        assert!(matches!(result, Err(TrackerError::Request { .. })));
    }
}
