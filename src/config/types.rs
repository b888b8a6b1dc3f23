use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for a whole planning request before answering 408
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct LlmConfig {
    /// Gemini API key (usually supplied through GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Wall-clock bound for the model call, retries included
    #[serde(default = "default_llm_timeout_sec")]
    pub timeout_sec: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_sec: default_llm_timeout_sec(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct JiraConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL, e.g. https://example.atlassian.net
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub project_key: Option<String>,

    #[serde(default = "default_jira_issue_type")]
    pub issue_type: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server: None,
            email: None,
            api_token: None,
            project_key: None,
            issue_type: default_jira_issue_type(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GithubConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub token: Option<String>,

    /// Repository in owner/repo form
    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            repo: None,
            api_base: default_github_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct EnrichmentConfig {
    /// Substrings of "{step} {task}" that make a task trackable
    #[serde(default = "default_tracker_keywords")]
    pub keywords: Vec<String>,

    /// Max tracker calls in flight for one plan
    #[serde(default = "default_enrichment_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_tracker_timeout_sec")]
    pub tracker_timeout_sec: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            keywords: default_tracker_keywords(),
            concurrency: default_enrichment_concurrency(),
            tracker_timeout_sec: default_tracker_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct FallbackConfig {
    /// Goal substrings that select the mobile fallback plan
    #[serde(default = "default_mobile_keywords")]
    pub mobile_keywords: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            mobile_keywords: default_mobile_keywords(),
        }
    }
}
