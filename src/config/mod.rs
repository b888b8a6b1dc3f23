mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Picked up from the working directory when no --config is given
pub const DEFAULT_CONFIG_FILE: &str = "planagent.yaml";

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the explicit file, else `planagent.yaml` if present, else defaults.
    /// Environment overrides are applied on top in every case.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay settings from environment variables. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GEMINI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = get("JIRA_SERVER") {
            self.jira.server = Some(v.trim_end_matches('/').to_string());
        }
        if let Some(v) = get("JIRA_EMAIL") {
            self.jira.email = Some(v);
        }
        if let Some(v) = get("JIRA_API_TOKEN") {
            self.jira.api_token = Some(v);
        }
        if let Some(v) = get("JIRA_PROJECT_KEY") {
            self.jira.project_key = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("GITHUB_REPO") {
            self.github.repo = Some(v);
        }
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_sec == 0 {
            return Err(invalid("llm.timeout_sec", "must be greater than zero"));
        }
        if self.server.request_timeout_sec == 0 {
            return Err(invalid("server.request_timeout_sec", "must be greater than zero"));
        }
        if self.enrichment.tracker_timeout_sec == 0 {
            return Err(invalid(
                "enrichment.tracker_timeout_sec",
                "must be greater than zero",
            ));
        }
        if self.enrichment.concurrency == 0 {
            return Err(invalid("enrichment.concurrency", "must be greater than zero"));
        }
        if self.llm.retry.max_attempts == 0 {
            return Err(invalid("llm.retry.max_attempts", "must be at least 1"));
        }
        let planning_budget = self.llm.timeout_sec + self.enrichment.tracker_timeout_sec;
        if self.server.request_timeout_sec <= planning_budget {
            return Err(invalid(
                "server.request_timeout_sec",
                format!(
                    "must exceed llm.timeout_sec + enrichment.tracker_timeout_sec ({}s)",
                    planning_budget
                ),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("{} is outside 0.0..=2.0", self.llm.temperature),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_match_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.timeout_sec, 60);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.max_output_tokens, 2048);
        assert_eq!(config.jira.issue_type, "Task");
        assert_eq!(config.fallback.mobile_keywords.len(), 4);
        assert!(config.enrichment.keywords.contains(&"api".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("GEMINI_API_KEY", "g-key"),
            ("JIRA_SERVER", "https://acme.atlassian.net/"),
            ("JIRA_PROJECT_KEY", "PLAN"),
            ("GITHUB_REPO", "acme/widgets"),
            ("PORT", "8080"),
        ]);
        let mut config = Config::default();
        config.apply_env_with(|k| vars.get(k).cloned());

        assert_eq!(config.llm.api_key.as_deref(), Some("g-key"));
        assert_eq!(
            config.jira.server.as_deref(),
            Some("https://acme.atlassian.net")
        );
        assert_eq!(config.jira.project_key.as_deref(), Some("PLAN"));
        assert_eq!(config.github.repo.as_deref(), Some("acme/widgets"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_ignores_blank_and_bad_values() {
        let vars = env(&[("GEMINI_API_KEY", "   "), ("PORT", "not-a-port")]);
        let mut config = Config::default();
        config.apply_env_with(|k| vars.get(k).cloned());

        assert!(config.llm.api_key.is_none());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
llm:
  timeout_sec: 30
  retry:
    max_attempts: 1
enrichment:
  keywords: [api, backend]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.timeout_sec, 30);
        assert_eq!(config.llm.retry.max_attempts, 1);
        assert_eq!(config.llm.retry.backoff_base_ms, 500);
        assert_eq!(config.enrichment.keywords, vec!["api", "backend"]);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.llm.timeout_sec = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.timeout_sec"));
    }

    #[test]
    fn test_validate_rejects_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_request_budget_above_model_and_tracker() {
        let mut config = Config::default();
        config.server.request_timeout_sec = 75;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.request_timeout_sec"));

        config.server.request_timeout_sec = 76;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/planagent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
