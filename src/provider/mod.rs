mod gemini;
mod retry;

pub use gemini::GeminiClient;
pub use retry::retry_with_backoff;

use crate::config::{Config, LlmConfig};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Sampling settings passed with every generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 2048,
        }
    }
}

impl From<&LlmConfig> for GenerationOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;
}

/// Create the configured language model client
pub fn create_model(config: &Config) -> Arc<dyn LanguageModel> {
    Arc::new(GeminiClient::from_config(&config.llm))
}
