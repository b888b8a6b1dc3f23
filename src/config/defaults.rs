pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    5000
}

pub fn default_request_timeout_sec() -> u64 {
    120
}

pub fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_temperature() -> f32 {
    0.1
}

pub fn default_max_output_tokens() -> u32 {
    2048
}

pub fn default_llm_timeout_sec() -> u64 {
    60
}

pub fn default_max_attempts() -> u32 {
    2
}

pub fn default_backoff_base_ms() -> u64 {
    500
}

pub fn default_jira_issue_type() -> String {
    "Task".to_string()
}

pub fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

pub fn default_tracker_keywords() -> Vec<String> {
    [
        "backend",
        "development",
        "api",
        "technical",
        "server",
        "database",
        "integration",
        "infrastructure",
        "deployment",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_mobile_keywords() -> Vec<String> {
    ["mobile", "app", "ios", "android"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_enrichment_concurrency() -> usize {
    4
}

pub fn default_tracker_timeout_sec() -> u64 {
    15
}

pub fn default_true() -> bool {
    true
}
