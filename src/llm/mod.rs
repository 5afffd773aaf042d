//! Text-generation capability used by the summarizer.
//!
//! Supports:
//! - **OpenAI**: chat completions via reqwest
//! - **Anthropic**: messages API via reqwest
//!
//! The `TextGenerator` trait is deliberately narrow (text-in, text-out,
//! fallible) so the summarizer's dedup and fallback logic can be tested
//! with a substitute implementation.

mod anthropic;
mod openai;

pub use anthropic::AnthropicGenerator;
pub use openai::OpenAiGenerator;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;

/// Supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Anthropic,
}

/// Configuration for creating a text generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GeneratorConfig {
    /// Default generation parameters: 120 tokens, low temperature.
    pub fn new(backend: LlmBackend, api_key: secrecy::SecretString, model: String) -> Self {
        Self {
            backend,
            api_key,
            model,
            max_tokens: 120,
            temperature: 0.2,
        }
    }
}

/// A fallible text-in, text-out generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Produce a completion for `user_text` under the `system` instruction.
    async fn generate(&self, system: &str, user_text: &str) -> Result<String, LlmError>;
}

/// Create a text generator from configuration.
pub fn create_generator(config: &GeneratorConfig) -> Arc<dyn TextGenerator> {
    match config.backend {
        LlmBackend::OpenAi => {
            tracing::info!("Using OpenAI (model: {})", config.model);
            Arc::new(OpenAiGenerator::new(config.clone()))
        }
        LlmBackend::Anthropic => {
            tracing::info!("Using Anthropic (model: {})", config.model);
            Arc::new(AnthropicGenerator::new(config.clone()))
        }
    }
}
