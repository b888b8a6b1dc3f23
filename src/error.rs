use std::path::PathBuf;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum PlanAgentError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key not configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether another attempt could succeed: network trouble, timeouts,
    /// rate limits and server-side errors
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::MissingApiKey(_) | ProviderError::InvalidResponse(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No JSON payload found in model output")]
    NoPayload,

    #[error("Unexpected JSON shape: {0}")]
    UnexpectedShape(String),

    #[error("No valid tasks found in response")]
    NoTasks,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{tracker} request failed: {source}")]
    Request {
        tracker: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{tracker} rejected issue ({status}): {message}")]
    Rejected {
        tracker: &'static str,
        status: u16,
        message: String,
    },

    #[error("{tracker} returned an unreadable response: {message}")]
    MalformedResponse {
        tracker: &'static str,
        message: String,
    },

    #[error("{tracker} call timed out after {timeout:?}")]
    Timeout {
        tracker: &'static str,
        timeout: std::time::Duration,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server terminated: {0}")]
    Serve(std::io::Error),
}
