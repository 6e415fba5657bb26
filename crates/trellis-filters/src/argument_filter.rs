use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use trellis_runtime::{FunctionFilter, FunctionInvokingContext, KernelArguments};

/// Overwrites function arguments before the body runs
pub struct ArgumentOverrideFilter {
    overrides: KernelArguments,
}

impl ArgumentOverrideFilter {
    pub fn new(overrides: KernelArguments) -> Self {
        Self { overrides }
    }

    /// Single `key = value` override
    pub fn set(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut overrides = KernelArguments::new();
        overrides.insert(key, value);
        Self::new(overrides)
    }
}

#[async_trait]
impl FunctionFilter for ArgumentOverrideFilter {
    fn name(&self) -> &str {
        "argument_override"
    }

    async fn on_function_invoking(&self, ctx: &mut FunctionInvokingContext) -> Result<()> {
        for (key, value) in self.overrides.iter() {
            debug!(function = %ctx.function(), argument = %key, "Overriding argument");
            ctx.arguments_mut().insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
