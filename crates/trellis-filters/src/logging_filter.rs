use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use trellis_runtime::{
    FunctionFilter, FunctionIdentity, FunctionInvokedContext, FunctionInvokingContext,
    PromptFilter, PromptRenderedContext, PromptRenderingContext,
};

/// Shared, ordered record of the lines logging filters emitted
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        // A poisoned transcript only means another writer panicked mid-push
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.push(line);
    }

    /// Copy of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn record(name: &str, stage: &str, function: &FunctionIdentity, transcript: Option<&Transcript>) {
    let line = format!("{}.{} - {}", name, stage, function);
    info!(filter = name, stage, function = %function, "{}", line);
    if let Some(transcript) = transcript {
        transcript.push(line);
    }
}

/// Logs every function invocation, before and after
pub struct LoggingFunctionFilter {
    name: String,
    transcript: Option<Transcript>,
}

impl LoggingFunctionFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transcript: None,
        }
    }

    /// Also append each line to `transcript`
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }
}

#[async_trait]
impl FunctionFilter for LoggingFunctionFilter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_function_invoking(&self, ctx: &mut FunctionInvokingContext) -> Result<()> {
        record(
            &self.name,
            "OnFunctionInvoking",
            ctx.function(),
            self.transcript.as_ref(),
        );
        Ok(())
    }

    async fn on_function_invoked(&self, ctx: &mut FunctionInvokedContext) -> Result<()> {
        record(
            &self.name,
            "OnFunctionInvoked",
            ctx.function(),
            self.transcript.as_ref(),
        );
        Ok(())
    }
}

/// Logs every prompt render, before and after
pub struct LoggingPromptFilter {
    name: String,
    transcript: Option<Transcript>,
}

impl LoggingPromptFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transcript: None,
        }
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }
}

#[async_trait]
impl PromptFilter for LoggingPromptFilter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_prompt_rendering(&self, ctx: &mut PromptRenderingContext) -> Result<()> {
        record(
            &self.name,
            "OnPromptRendering",
            ctx.function(),
            self.transcript.as_ref(),
        );
        Ok(())
    }

    async fn on_prompt_rendered(&self, ctx: &mut PromptRenderedContext) -> Result<()> {
        record(
            &self.name,
            "OnPromptRendered",
            ctx.function(),
            self.transcript.as_ref(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_runtime::{
        EchoCompletion, Kernel, KernelArguments, KernelFunction, KernelPlugin, PromptFunction,
    };

    #[tokio::test]
    async fn test_transcript_matches_registration_order() {
        let transcript = Transcript::new();
        let function: Arc<dyn KernelFunction> =
            Arc::new(PromptFunction::from_prompt("MyFunction", "What is Seattle"));
        let kernel = Kernel::builder()
            .with_chat_completion(Arc::new(EchoCompletion::new()))
            .add_function_filter(Arc::new(
                LoggingFunctionFilter::new("FirstFunctionFilter")
                    .with_transcript(transcript.clone()),
            ))
            .add_function_filter(Arc::new(
                LoggingFunctionFilter::new("SecondFunctionFilter")
                    .with_transcript(transcript.clone()),
            ))
            .add_prompt_filter(Arc::new(
                LoggingPromptFilter::new("FirstPromptFilter").with_transcript(transcript.clone()),
            ))
            .add_plugin(KernelPlugin::from_functions("MyPlugin", vec![function]))
            .build();

        kernel
            .invoke_by_name("MyPlugin", "MyFunction", KernelArguments::new())
            .await
            .unwrap();

        assert_eq!(
            transcript.lines(),
            vec![
                "FirstFunctionFilter.OnFunctionInvoking - MyPlugin.MyFunction",
                "SecondFunctionFilter.OnFunctionInvoking - MyPlugin.MyFunction",
                "FirstPromptFilter.OnPromptRendering - MyPlugin.MyFunction",
                "FirstPromptFilter.OnPromptRendered - MyPlugin.MyFunction",
                "FirstFunctionFilter.OnFunctionInvoked - MyPlugin.MyFunction",
                "SecondFunctionFilter.OnFunctionInvoked - MyPlugin.MyFunction",
            ]
        );
    }
}
