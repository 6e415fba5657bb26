use anyhow::Result;
use async_trait::async_trait;

use super::types::ChatResponse;

/// Chat completion service - abstraction over whatever model backs prompt functions
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send a fully rendered prompt, return the model's reply
    async fn complete(&self, prompt: &str) -> Result<ChatResponse>;

    /// Model name for logging/tracking
    fn model_name(&self) -> &str;
}
