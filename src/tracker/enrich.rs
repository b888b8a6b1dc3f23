use super::{IssueRef, IssueTracker, TrackerKind};
use crate::config::EnrichmentConfig;
use crate::error::TrackerError;
use crate::planner::keywords::KeywordSet;
use crate::planner::types::TaskItem;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Files tracker issues for technical tasks and attaches the links.
///
/// Not idempotent: every call creates new issues.
pub struct Enricher {
    trackers: Vec<Arc<dyn IssueTracker>>,
    keywords: KeywordSet,
    call_timeout: Duration,
    concurrency: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub trackable: usize,
    pub created: usize,
    pub failed: usize,
}

impl Enricher {
    pub fn new(
        trackers: Vec<Arc<dyn IssueTracker>>,
        keywords: KeywordSet,
        call_timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            trackers,
            keywords,
            call_timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(trackers: Vec<Arc<dyn IssueTracker>>, config: &EnrichmentConfig) -> Self {
        let keywords = KeywordSet::new(&config.keywords);
        if keywords.is_empty() && !trackers.is_empty() {
            warn!("No trackability keywords configured; no issues will be filed");
        }
        Self::new(
            trackers,
            keywords,
            Duration::from_secs(config.tracker_timeout_sec),
            config.concurrency,
        )
    }

    pub fn is_trackable(&self, task: &TaskItem) -> bool {
        self.keywords.matches(&task.classification_text())
    }

    /// Enrich in place. Failures only leave fields empty; nothing propagates.
    pub async fn enrich(&self, tasks: &mut [TaskItem]) -> EnrichmentSummary {
        self.enrich_until(tasks, None).await
    }

    /// Like [`Enricher::enrich`], but calls still running at `deadline` are
    /// abandoned and their tasks keep empty issue fields.
    pub async fn enrich_before(
        &self,
        tasks: &mut [TaskItem],
        deadline: Instant,
    ) -> EnrichmentSummary {
        self.enrich_until(tasks, Some(deadline)).await
    }

    async fn enrich_until(
        &self,
        tasks: &mut [TaskItem],
        deadline: Option<Instant>,
    ) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();
        let mut jobs = Vec::new();

        for (idx, task) in tasks.iter_mut().enumerate() {
            task.attach_issue(TrackerKind::Jira, None);
            task.attach_issue(TrackerKind::GitHub, None);

            if !self.is_trackable(task) {
                continue;
            }
            summary.trackable += 1;
            debug!(
                "Task {} is trackable (matched {:?})",
                task.task,
                self.keywords.first_match(&task.classification_text())
            );

            for tracker in &self.trackers {
                jobs.push((
                    idx,
                    tracker.clone(),
                    task.issue_title(),
                    task.description.clone(),
                ));
            }
        }

        if jobs.is_empty() {
            return summary;
        }

        let call_timeout = self.call_timeout;
        let total = jobs.len();
        let futures: Vec<_> = jobs
            .into_iter()
            .map(|(idx, tracker, title, body)| async move {
                let kind = tracker.kind();
                let result = match timeout(call_timeout, tracker.create_issue(&title, &body)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(TrackerError::Timeout {
                        tracker: kind.as_str(),
                        timeout: call_timeout,
                    }),
                };
                let issue = match result {
                    Ok(issue) => {
                        info!("Created {} issue {} for '{}'", kind, issue.id, title);
                        Some(issue)
                    }
                    Err(e) => {
                        warn!("{} issue creation failed for '{}': {}", kind, title, e);
                        None
                    }
                };
                (idx, kind, issue)
            })
            .collect();
        let mut pending = stream::iter(futures)
            .buffer_unordered(self.concurrency);

        let mut results: Vec<(usize, TrackerKind, Option<IssueRef>)> = Vec::with_capacity(total);
        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, pending.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            "Enrichment deadline reached; abandoning {} of {} issue calls",
                            total - results.len(),
                            total
                        );
                        summary.failed += total - results.len();
                        break;
                    }
                },
                None => pending.next().await,
            };
            match next {
                Some(result) => results.push(result),
                None => break,
            }
        }

        for (idx, kind, issue) in results {
            if issue.is_some() {
                summary.created += 1;
            } else {
                summary.failed += 1;
            }
            tasks[idx].attach_issue(kind, issue);
        }

        summary
    }
}
