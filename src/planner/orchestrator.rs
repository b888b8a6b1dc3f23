//! Drives one planning run: model call, normalize, parse, enrich.
//!
//! Every failure on the way lands in the fallback state, so `plan` always
//! yields a usable task list.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use super::fallback::FallbackPlanner;
use super::prompt::render_prompt;
use super::types::{FallbackReason, PlanOutcome, PlanSource, TaskItem};
use crate::config::{Config, RetryConfig};
use crate::error::ProviderError;
use crate::parser::{json_candidates, parse_candidates};
use crate::provider::{retry_with_backoff, GenerationOptions, LanguageModel};
use crate::tracker::{Enricher, IssueTracker};

/// Slice of a request budget kept free for serializing the response
const ENRICHMENT_RESERVE: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum PlanState {
    Start,
    ModelCall,
    Normalize(String),
    Parse(Vec<String>),
    Enrich(Vec<TaskItem>),
    Fallback(FallbackReason),
    Done(PlanOutcome),
}

pub struct Planner {
    model: Arc<dyn LanguageModel>,
    enricher: Enricher,
    fallback: FallbackPlanner,
    options: GenerationOptions,
    model_timeout: Duration,
    retry: RetryConfig,
}

impl Planner {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        enricher: Enricher,
        fallback: FallbackPlanner,
        options: GenerationOptions,
        model_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            model,
            enricher,
            fallback,
            options,
            model_timeout,
            retry,
        }
    }

    pub fn from_config(
        config: &Config,
        model: Arc<dyn LanguageModel>,
        trackers: Vec<Arc<dyn IssueTracker>>,
    ) -> Self {
        Self::new(
            model,
            Enricher::from_config(trackers, &config.enrichment),
            FallbackPlanner::from_config(&config.fallback),
            GenerationOptions::from(&config.llm),
            Duration::from_secs(config.llm.timeout_sec),
            config.llm.retry.clone(),
        )
    }

    /// Plan a goal. Never fails; falls back to the deterministic plan.
    pub async fn plan(&self, goal: &str) -> PlanOutcome {
        self.run(goal, None).await
    }

    /// Plan a goal that must be answered within `budget`. Tracker calls still
    /// pending near the end of the budget are abandoned so the plan is returned.
    pub async fn plan_within(&self, goal: &str, budget: Duration) -> PlanOutcome {
        let reserve = (budget / 10).min(ENRICHMENT_RESERVE);
        let deadline = Instant::now() + budget.saturating_sub(reserve);
        self.run(goal, Some(deadline)).await
    }

    async fn run(&self, goal: &str, deadline: Option<Instant>) -> PlanOutcome {
        let start = Instant::now();
        let mut state = PlanState::Start;

        loop {
            debug!("Plan state: {}", state.label());
            state = match state {
                PlanState::Start => PlanState::ModelCall,
                PlanState::ModelCall => self.call_model(goal).await,
                PlanState::Normalize(raw) => normalize(&raw),
                PlanState::Parse(candidates) => parse(&candidates),
                PlanState::Enrich(tasks) => self.enrich(tasks, deadline).await,
                PlanState::Fallback(reason) => self.fall_back(goal, reason),
                PlanState::Done(outcome) => {
                    info!(
                        "Planned {} tasks from {:?} in {:?}",
                        outcome.tasks.len(),
                        outcome.source,
                        start.elapsed()
                    );
                    return outcome;
                }
            };
        }
    }

    async fn call_model(&self, goal: &str) -> PlanState {
        let prompt = render_prompt(goal);
        let model = &self.model;
        let options = &self.options;

        let call = retry_with_backoff(&self.retry, ProviderError::is_transient, || {
            model.generate(&prompt, options)
        });

        match timeout(self.model_timeout, call).await {
            Ok(Ok(raw)) => {
                debug!("{} replied with {} chars", model.name(), raw.len());
                PlanState::Normalize(raw)
            }
            Ok(Err(ProviderError::Timeout(after))) => {
                warn!("{} timed out after {:?}", model.name(), after);
                PlanState::Fallback(FallbackReason::ModelTimedOut)
            }
            Ok(Err(e)) => {
                warn!("{} call failed: {}", model.name(), e);
                PlanState::Fallback(FallbackReason::ModelFailed)
            }
            Err(_) => {
                warn!(
                    "{} did not answer within {:?}",
                    model.name(),
                    self.model_timeout
                );
                PlanState::Fallback(FallbackReason::ModelTimedOut)
            }
        }
    }

    async fn enrich(&self, mut tasks: Vec<TaskItem>, deadline: Option<Instant>) -> PlanState {
        let summary = match deadline {
            Some(deadline) => self.enricher.enrich_before(&mut tasks, deadline).await,
            None => self.enricher.enrich(&mut tasks).await,
        };
        if summary.trackable > 0 {
            info!(
                "Enrichment: {} trackable tasks, {} issues created, {} failed",
                summary.trackable, summary.created, summary.failed
            );
        }
        PlanState::Done(PlanOutcome {
            tasks,
            source: PlanSource::Model,
        })
    }

    fn fall_back(&self, goal: &str, reason: FallbackReason) -> PlanState {
        let kind = self.fallback.classify(goal);
        warn!("Using {:?} fallback plan ({})", kind, reason);
        PlanState::Done(PlanOutcome {
            tasks: self.fallback.plan(goal),
            source: PlanSource::Fallback(reason),
        })
    }
}

fn normalize(raw: &str) -> PlanState {
    let candidates = json_candidates(raw);
    if candidates.is_empty() {
        debug!(
            "No JSON in model reply: {}...",
            raw.chars().take(120).collect::<String>()
        );
        PlanState::Fallback(FallbackReason::UnusableOutput)
    } else {
        PlanState::Parse(candidates)
    }
}

fn parse(candidates: &[String]) -> PlanState {
    match parse_candidates(candidates) {
        Ok(tasks) => PlanState::Enrich(tasks),
        Err(e) => {
            warn!("Model output unusable: {}", e);
            PlanState::Fallback(FallbackReason::UnusableOutput)
        }
    }
}

impl PlanState {
    fn label(&self) -> &'static str {
        match self {
            PlanState::Start => "start",
            PlanState::ModelCall => "model_call",
            PlanState::Normalize(_) => "normalize",
            PlanState::Parse(_) => "parse",
            PlanState::Enrich(_) => "enrich",
            PlanState::Fallback(_) => "fallback",
            PlanState::Done(_) => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::keywords::KeywordSet;
    use crate::testutil::{FakeModel, FakeTracker};
    use crate::tracker::TrackerKind;
    use std::sync::atomic::Ordering;

    const FENCED_REPLY: &str = r#"Here is your plan:
```json
{
  "tasks": [
    {"step": "Backend Development", "task": "Build REST API", "technologies": ["Rust"], "estimated_time": "2 weeks"},
    {"step": "Design", "task": "Design Mockups", "deliverables": "Figma file"},
    {"task": "Write docs"}
  ]
}
```
Let me know if you need more."#;

    fn planner_with(model: Arc<FakeModel>, trackers: Vec<Arc<dyn IssueTracker>>) -> Planner {
        Planner::new(
            model,
            Enricher::new(
                trackers,
                KeywordSet::new(crate::config::EnrichmentConfig::default().keywords),
                Duration::from_millis(200),
                4,
            ),
            FallbackPlanner::default(),
            GenerationOptions::default(),
            Duration::from_millis(300),
            RetryConfig {
                max_attempts: 2,
                backoff_base_ms: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed_in_order() {
        let model = Arc::new(FakeModel::replying(FENCED_REPLY));
        let planner = planner_with(model.clone(), Vec::new());

        let outcome = planner.plan("Build a todo service").await;

        assert_eq!(outcome.source, PlanSource::Model);
        assert!(outcome.note().is_none());
        let tasks: Vec<_> = outcome.tasks.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(tasks, vec!["Build REST API", "Design Mockups", "Write docs"]);
        assert_eq!(outcome.tasks[1].deliverables, vec!["Figma file"]);
        assert_eq!(outcome.tasks[2].step, "Step 3");
        assert_eq!(outcome.tasks[2].description, "Write docs");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Goal: Build a todo service"));
    }

    #[tokio::test]
    async fn test_bare_array_reply_is_accepted() {
        let reply = r#"[{"step": "A", "task": "First"}, {"step": "B", "task": "Second"}]"#;
        let planner = planner_with(Arc::new(FakeModel::replying(reply)), Vec::new());

        let outcome = planner.plan("anything").await;

        assert_eq!(outcome.source, PlanSource::Model);
        assert_eq!(outcome.tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_prose_reply_falls_back_with_note() {
        let planner = planner_with(
            Arc::new(FakeModel::replying("I cannot help with that.")),
            Vec::new(),
        );

        let outcome = planner.plan("Build an iOS app").await;

        assert_eq!(
            outcome.source,
            PlanSource::Fallback(FallbackReason::UnusableOutput)
        );
        assert_eq!(
            outcome.note(),
            Some("Generated using intelligent task analysis")
        );
        assert_eq!(outcome.tasks[0].step, "Requirements Analysis");
    }

    #[tokio::test]
    async fn test_empty_task_list_falls_back() {
        let planner = planner_with(
            Arc::new(FakeModel::replying(r#"{"tasks": []}"#)),
            Vec::new(),
        );

        let outcome = planner.plan("Launch a newsletter").await;

        assert_eq!(
            outcome.source,
            PlanSource::Fallback(FallbackReason::UnusableOutput)
        );
        assert_eq!(outcome.tasks[0].step, "Project Planning");
    }

    #[tokio::test]
    async fn test_stalled_model_times_out() {
        let planner = planner_with(
            Arc::new(FakeModel::stalling(Duration::from_secs(10))),
            Vec::new(),
        );

        let outcome = planner.plan("Build a web portal").await;

        assert_eq!(
            outcome.source,
            PlanSource::Fallback(FallbackReason::ModelTimedOut)
        );
        assert_eq!(
            outcome.note(),
            Some("Generated using fallback task analysis due to processing error")
        );
    }

    #[tokio::test]
    async fn test_failing_model_is_retried_then_deterministic() {
        let model = Arc::new(FakeModel::failing());
        let planner = planner_with(model.clone(), Vec::new());

        let first = planner.plan("Build an android app").await;
        let second = planner.plan("Build an android app").await;

        assert_eq!(model.calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            first.source,
            PlanSource::Fallback(FallbackReason::ModelFailed)
        );
        assert_eq!(first.tasks, second.tasks);
    }

    #[tokio::test]
    async fn test_missing_key_is_tried_once() {
        let model = Arc::new(FakeModel::without_key());
        let planner = planner_with(model.clone(), Vec::new());

        let outcome = planner.plan("Build a website").await;

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcome.source,
            PlanSource::Fallback(FallbackReason::ModelFailed)
        );
    }

    #[tokio::test]
    async fn test_plan_within_abandons_stalled_trackers() {
        let jira: Arc<dyn IssueTracker> =
            Arc::new(FakeTracker::new(TrackerKind::Jira).stalling_on("Backend"));
        let planner = Planner::new(
            Arc::new(FakeModel::replying(FENCED_REPLY)),
            Enricher::new(
                vec![jira],
                KeywordSet::new(["backend"]),
                Duration::from_secs(10),
                4,
            ),
            FallbackPlanner::default(),
            GenerationOptions::default(),
            Duration::from_secs(1),
            RetryConfig::default(),
        );

        let started = std::time::Instant::now();
        let outcome = planner
            .plan_within("Build a todo service", Duration::from_millis(300))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(outcome.source, PlanSource::Model);
        assert_eq!(outcome.tasks[0].step, "Backend Development");
        assert!(outcome.tasks[0].jira_issue.is_none());
    }

    #[tokio::test]
    async fn test_model_plan_is_enriched() {
        let jira = Arc::new(FakeTracker::new(TrackerKind::Jira));
        let planner = planner_with(Arc::new(FakeModel::replying(FENCED_REPLY)), vec![jira]);

        let outcome = planner.plan("Build a todo service").await;

        assert_eq!(outcome.tasks[0].jira_issue.as_deref(), Some("jira-1"));
        assert!(outcome.tasks[1].jira_issue.is_none());
    }

    #[tokio::test]
    async fn test_fallback_tasks_are_not_sent_to_trackers() {
        let jira = Arc::new(FakeTracker::new(TrackerKind::Jira));
        let planner = planner_with(Arc::new(FakeModel::failing()), vec![jira.clone()]);

        let outcome = planner.plan("Build backend infrastructure").await;

        assert!(jira.titles.lock().unwrap().is_empty());
        assert!(outcome.tasks.iter().all(|t| t.jira_issue.is_none()));
    }

    #[test]
    fn test_normalize_and_parse_transitions() {
        assert!(matches!(
            normalize("no json here"),
            PlanState::Fallback(FallbackReason::UnusableOutput)
        ));
        assert!(matches!(normalize(r#"{"tasks": []}"#), PlanState::Parse(_)));
        assert!(matches!(
            parse(&[r#"{"items": []}"#.to_string()]),
            PlanState::Fallback(FallbackReason::UnusableOutput)
        ));
        match parse(&[r#"{"tasks": [{"step": "S", "task": "T"}]}"#.to_string()]) {
            PlanState::Enrich(tasks) => assert_eq!(tasks.len(), 1),
            other => panic!("unexpected state {:?}", other),
        }
    }
}
