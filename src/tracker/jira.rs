use super::{IssueRef, IssueTracker, TrackerKind};
use crate::config::JiraConfig;
use crate::error::TrackerError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const TRACKER: &str = "jira";

/// Creates issues through the Jira REST API (v2, basic auth with an API token)
pub struct JiraTracker {
    client: Client,
    server: String,
    email: String,
    api_token: String,
    project_key: String,
    issue_type: String,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize, Default)]
struct JiraErrorBody {
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, Value>,
}

impl JiraTracker {
    /// `None` unless server, email, token and project key are all set
    pub fn from_config(config: &JiraConfig) -> Option<Self> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        Some(Self {
            client: Client::new(),
            server: non_empty(&config.server)?.trim_end_matches('/').to_string(),
            email: non_empty(&config.email)?,
            api_token: non_empty(&config.api_token)?,
            project_key: non_empty(&config.project_key)?,
            issue_type: config.issue_type.clone(),
        })
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    fn request_body(&self, title: &str, body: &str) -> Value {
        json!({
            "fields": {
                "project": { "key": self.project_key },
                "summary": title,
                "description": body,
                "issuetype": { "name": self.issue_type },
            }
        })
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.server, key)
    }
}

/// Flatten Jira's error payload into one line
fn error_message(body: &str) -> String {
    let parsed: JiraErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut parts = parsed.error_messages;
    for (field, message) in parsed.errors {
        let message = message.as_str().map(String::from).unwrap_or_else(|| message.to_string());
        parts.push(format!("{}: {}", field, message));
    }
    if parts.is_empty() {
        body.trim().chars().take(300).collect()
    } else {
        parts.join("; ")
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Jira
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef, TrackerError> {
        let url = format!("{}/rest/api/2/issue", self.server);
        debug!("Creating Jira issue in {}: {}", self.project_key, title);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .json(&self.request_body(title, body))
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
            return Err(TrackerError::Rejected {
                tracker: TRACKER,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let created: CreatedIssue =
            serde_json::from_str(&text).map_err(|e| TrackerError::MalformedResponse {
                tracker: TRACKER,
                message: e.to_string(),
            })?;

        Ok(IssueRef {
            url: self.browse_url(&created.key),
            id: created.key,
        })
    }
}
