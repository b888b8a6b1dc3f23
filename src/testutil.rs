//! Test doubles for the model and tracker boundaries.

use crate::error::{ProviderError, TrackerError};
use crate::provider::{GenerationOptions, LanguageModel};
use crate::tracker::{IssueRef, IssueTracker, TrackerKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a [`FakeModel`] does when called
pub enum FakeReply {
    Text(String),
    Fail,
    NoKey,
    Stall(Duration),
}

pub struct FakeModel {
    reply: FakeReply,
    pub calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(FakeReply::Text(text.into()))
    }

    pub fn failing() -> Self {
        Self::new(FakeReply::Fail)
    }

    pub fn without_key() -> Self {
        Self::new(FakeReply::NoKey)
    }

    pub fn stalling(delay: Duration) -> Self {
        Self::new(FakeReply::Stall(delay))
    }

    fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::Fail => Err(ProviderError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            }),
            FakeReply::NoKey => Err(ProviderError::MissingApiKey("fake")),
            FakeReply::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(String::new())
            }
        }
    }
}

/// In-memory tracker: numbers issues, can fail or stall on matching titles
pub struct FakeTracker {
    kind: TrackerKind,
    fail_on: Option<&'static str>,
    stall_on: Option<&'static str>,
    next: AtomicU32,
    pub titles: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn new(kind: TrackerKind) -> Self {
        Self {
            kind,
            fail_on: None,
            stall_on: None,
            next: AtomicU32::new(1),
            titles: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, needle: &'static str) -> Self {
        self.fail_on = Some(needle);
        self
    }

    pub fn stalling_on(mut self, needle: &'static str) -> Self {
        self.stall_on = Some(needle);
        self
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    fn kind(&self) -> TrackerKind {
        self.kind
    }

    async fn create_issue(&self, title: &str, _body: &str) -> Result<IssueRef, TrackerError> {
        self.titles.lock().unwrap().push(title.to_string());
        if self.stall_on.is_some_and(|n| title.contains(n)) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail_on.is_some_and(|n| title.contains(n)) {
            return Err(TrackerError::Rejected {
                tracker: "fake",
                status: 401,
                message: "unauthorized".to_string(),
            });
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(IssueRef {
            id: format!("{}-{}", self.kind, n),
            url: format!("https://tracker.test/{}/{}", self.kind, n),
        })
    }
}
