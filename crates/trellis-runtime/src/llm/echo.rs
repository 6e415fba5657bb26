use anyhow::Result;
use async_trait::async_trait;

use super::provider::ChatCompletion;
use super::types::{ChatResponse, Usage};

/// In-process completion that replies with the prompt it was given.
/// Usage counts whitespace-separated words on both sides.
#[derive(Debug, Clone, Default)]
pub struct EchoCompletion {
    prefix: String,
}

impl EchoCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every reply
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[async_trait]
impl ChatCompletion for EchoCompletion {
    async fn complete(&self, prompt: &str) -> Result<ChatResponse> {
        let content = format!("{}{}", self.prefix, prompt);
        let usage = Usage {
            input_tokens: prompt.split_whitespace().count() as u32,
            output_tokens: content.split_whitespace().count() as u32,
        };
        Ok(ChatResponse {
            content,
            usage: Some(usage),
        })
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}
