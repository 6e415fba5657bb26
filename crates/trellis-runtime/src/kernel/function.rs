use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::debug;

use super::Kernel;
use crate::arguments::{FunctionIdentity, FunctionResult, KernelArguments};
use crate::error::FilterError;
use crate::hooks::{InvocationOutcome, PromptRenderer};

/// A unit of work the kernel can invoke through the function filters
#[async_trait]
pub trait KernelFunction: Send + Sync {
    fn name(&self) -> &str;

    /// Function body. `function` is the identity filters saw for this call.
    async fn invoke(
        &self,
        kernel: &Kernel,
        function: &FunctionIdentity,
        arguments: KernelArguments,
    ) -> Result<InvocationOutcome<FunctionResult>>;
}

/// A function paired with the identity it is invoked under
#[derive(Clone)]
pub struct FunctionHandle {
    identity: FunctionIdentity,
    function: Arc<dyn KernelFunction>,
}

impl FunctionHandle {
    /// Handle for a function outside any plugin
    pub fn new(function: Arc<dyn KernelFunction>) -> Self {
        Self {
            identity: FunctionIdentity::new(function.name()),
            function,
        }
    }

    pub(crate) fn in_plugin(plugin_name: &str, function: Arc<dyn KernelFunction>) -> Self {
        Self {
            identity: FunctionIdentity::in_plugin(plugin_name, function.name()),
            function,
        }
    }

    pub fn identity(&self) -> &FunctionIdentity {
        &self.identity
    }

    pub fn function(&self) -> &Arc<dyn KernelFunction> {
        &self.function
    }
}

impl std::fmt::Debug for FunctionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FunctionHandle").field(&self.identity).finish()
    }
}

type NativeBody = dyn Fn(KernelArguments) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// Function backed by an async closure
pub struct NativeFunction {
    name: String,
    body: Box<NativeBody>,
}

impl NativeFunction {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(KernelArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move |args| body(args).boxed()),
        }
    }
}

#[async_trait]
impl KernelFunction for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        _kernel: &Kernel,
        _function: &FunctionIdentity,
        arguments: KernelArguments,
    ) -> Result<InvocationOutcome<FunctionResult>> {
        let value = (self.body)(arguments).await?;
        Ok(InvocationOutcome::Completed(FunctionResult::new(value)))
    }
}

/// Renderer that returns its prompt text unchanged
#[derive(Debug, Clone)]
pub struct TextPrompt {
    text: String,
}

impl TextPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl PromptRenderer for TextPrompt {
    async fn render(&self, _arguments: KernelArguments) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Function that renders a prompt through the prompt filters and sends it to
/// the kernel's chat completion service
pub struct PromptFunction {
    name: String,
    renderer: Arc<dyn PromptRenderer>,
}

impl PromptFunction {
    pub fn from_prompt(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::with_renderer(name, Arc::new(TextPrompt::new(prompt)))
    }

    pub fn with_renderer(name: impl Into<String>, renderer: Arc<dyn PromptRenderer>) -> Self {
        Self {
            name: name.into(),
            renderer,
        }
    }
}

#[async_trait]
impl KernelFunction for PromptFunction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        kernel: &Kernel,
        function: &FunctionIdentity,
        arguments: KernelArguments,
    ) -> Result<InvocationOutcome<FunctionResult>> {
        let service = kernel
            .chat_completion()
            .ok_or(FilterError::MissingService("chat completion"))?;

        let invoked_with = serde_json::to_value(&arguments)?;
        let prompt = match kernel
            .render_prompt(function, arguments, self.renderer.as_ref())
            .await?
        {
            InvocationOutcome::Completed(prompt) => prompt,
            InvocationOutcome::Cancelled => return Ok(InvocationOutcome::Cancelled),
        };

        debug!(function = %function, model = service.model_name(), "Sending rendered prompt");

        let response = service
            .complete(&prompt)
            .await
            .context(format!("Chat completion failed for '{}'", function))?;

        let mut metadata = Map::new();
        metadata.insert("RenderedPrompt".into(), Value::String(prompt));
        metadata.insert("ModelName".into(), service.model_name().into());
        metadata.insert("Arguments".into(), invoked_with);
        if let Some(usage) = response.usage {
            metadata.insert("Usage".into(), serde_json::to_value(usage)?);
        }

        Ok(InvocationOutcome::Completed(FunctionResult::with_metadata(
            response.content,
            metadata,
        )))
    }
}
