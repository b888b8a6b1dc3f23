//! Task records shared by the planner, enrichment, HTTP and report layers

use serde::{Deserialize, Serialize};

use crate::tracker::{IssueRef, TrackerKind};

pub const DEFAULT_ESTIMATED_TIME: &str = "TBD";

/// Body of a planning request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoalRequest {
    pub goal: String,
}

/// One actionable unit of a plan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskItem {
    /// Project phase, e.g. "Backend Development"
    pub step: String,

    /// Short task title
    pub task: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[serde(default)]
    pub deliverables: Vec<String>,

    #[serde(default = "default_estimated_time")]
    pub estimated_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_issue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
}

fn default_estimated_time() -> String {
    DEFAULT_ESTIMATED_TIME.to_string()
}

impl TaskItem {
    pub fn new(step: impl Into<String>, task: impl Into<String>) -> Self {
        let task = task.into();
        Self {
            step: step.into(),
            description: task.clone(),
            task,
            technologies: Vec::new(),
            deliverables: Vec::new(),
            estimated_time: default_estimated_time(),
            jira_issue: None,
            jira_link: None,
            github_issue: None,
            github_link: None,
        }
    }

    /// Text the trackability keywords are matched against
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.step, self.task)
    }

    /// Title used when filing a tracker issue
    pub fn issue_title(&self) -> String {
        format!("{}: {}", self.step, self.task)
    }

    /// Fill gaps left by callers that supplied a partial task
    pub fn normalized(mut self) -> Self {
        if self.description.trim().is_empty() {
            self.description = self.task.clone();
        }
        if self.estimated_time.trim().is_empty() {
            self.estimated_time = default_estimated_time();
        }
        self
    }

    /// Record the outcome of one tracker call; `None` clears both fields
    pub fn attach_issue(&mut self, kind: TrackerKind, issue: Option<IssueRef>) {
        let (id, link) = match issue {
            Some(issue) => (Some(issue.id), Some(issue.url)),
            None => (None, None),
        };
        match kind {
            TrackerKind::Jira => {
                self.jira_issue = id;
                self.jira_link = link;
            }
            TrackerKind::GitHub => {
                self.github_issue = id;
                self.github_link = link;
            }
        }
    }
}

/// Why the deterministic plan was returned instead of the model's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Backend error: network, auth, quota, missing key
    ModelFailed,
    ModelTimedOut,
    /// No JSON, wrong shape or an empty task list
    UnusableOutput,
}

impl FallbackReason {
    pub fn note(&self) -> &'static str {
        match self {
            FallbackReason::UnusableOutput => "Generated using intelligent task analysis",
            FallbackReason::ModelFailed | FallbackReason::ModelTimedOut => {
                "Generated using fallback task analysis due to processing error"
            }
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::ModelFailed => write!(f, "model_failed"),
            FallbackReason::ModelTimedOut => write!(f, "model_timed_out"),
            FallbackReason::UnusableOutput => write!(f, "unusable_output"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    Fallback(FallbackReason),
}

/// Result of one planning run; always carries a non-empty task list
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub tasks: Vec<TaskItem>,
    pub source: PlanSource,
}

impl PlanOutcome {
    pub fn note(&self) -> Option<&'static str> {
        match self.source {
            PlanSource::Model => None,
            PlanSource::Fallback(reason) => Some(reason.note()),
        }
    }

    pub fn into_response(self) -> PlanResponse {
        PlanResponse {
            note: self.note().map(String::from),
            tasks: self.tasks,
        }
    }
}

/// Wire shape of a planning response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanResponse {
    pub tasks: Vec<TaskItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_issue_fields_are_omitted() {
        let task = TaskItem::new("Design", "Design Mockups");
        let json = serde_json::to_value(&task).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("jira_issue"));
        assert!(!obj.contains_key("github_link"));
        assert_eq!(obj["estimated_time"], "TBD");
    }

    #[test]
    fn test_deserialize_partial_task_fills_defaults() {
        let task: TaskItem =
            serde_json::from_str(r#"{"step": "Backend", "task": "Build API"}"#).unwrap();
        let task = task.normalized();
        assert_eq!(task.description, "Build API");
        assert!(task.technologies.is_empty());
        assert_eq!(task.estimated_time, "TBD");
    }

    #[test]
    fn test_attach_and_clear_issue() {
        let mut task = TaskItem::new("Backend Development", "Build API");
        task.attach_issue(
            TrackerKind::GitHub,
            Some(IssueRef {
                id: "42".to_string(),
                url: "https://github.com/acme/widgets/issues/42".to_string(),
            }),
        );
        assert_eq!(task.github_issue.as_deref(), Some("42"));
        assert!(task.jira_issue.is_none());

        task.attach_issue(TrackerKind::GitHub, None);
        assert!(task.github_issue.is_none());
        assert!(task.github_link.is_none());
    }

    #[test]
    fn test_outcome_note() {
        let model = PlanOutcome {
            tasks: vec![TaskItem::new("a", "b")],
            source: PlanSource::Model,
        };
        assert!(model.into_response().note.is_none());

        let fallback = PlanOutcome {
            tasks: vec![TaskItem::new("a", "b")],
            source: PlanSource::Fallback(FallbackReason::ModelTimedOut),
        };
        let response = fallback.into_response();
        assert!(response.note.unwrap().contains("processing error"));
    }
}
