use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use trellis_runtime::{FunctionFilter, FunctionInvokedContext, PromptFilter, PromptRenderedContext};

/// Replaces every function result value
pub struct ResultOverrideFilter {
    value: Value,
}

impl ResultOverrideFilter {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl FunctionFilter for ResultOverrideFilter {
    fn name(&self) -> &str {
        "result_override"
    }

    async fn on_function_invoked(&self, ctx: &mut FunctionInvokedContext) -> Result<()> {
        info!(function = %ctx.function(), "Overriding function result");
        ctx.set_result_value(self.value.clone());
        Ok(())
    }
}

/// Replaces every rendered prompt before it reaches the model
pub struct PromptOverrideFilter {
    prompt: String,
}

impl PromptOverrideFilter {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl PromptFilter for PromptOverrideFilter {
    fn name(&self) -> &str {
        "prompt_override"
    }

    async fn on_prompt_rendered(&self, ctx: &mut PromptRenderedContext) -> Result<()> {
        info!(
            function = %ctx.function(),
            original_len = ctx.rendered_prompt().len(),
            "Overriding rendered prompt"
        );
        ctx.set_rendered_prompt(self.prompt.clone());
        Ok(())
    }
}
