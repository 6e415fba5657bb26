//! Kernel: plugins, services and the frozen filter pipeline.
//!
//! Filters are registered on a `KernelBuilder`. The built `Kernel` owns an
//! immutable snapshot, so concurrent invocations need no locking. To change the
//! filters of a running host, derive a builder with `to_builder` and build a
//! new kernel; in-flight invocations keep the snapshot they started with.

pub mod function;
pub mod plugin;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::arguments::{FunctionIdentity, FunctionResult, KernelArguments};
use crate::error::FilterError;
use crate::hooks::{
    FilterPipeline, FilterRegistry, FunctionFilter, FunctionInvokingContext, Hook, HookKind,
    InvocationOutcome, PromptFilter, PromptRenderer,
};
use crate::llm::ChatCompletion;

pub use function::{FunctionHandle, KernelFunction, NativeFunction, PromptFunction, TextPrompt};
pub use plugin::KernelPlugin;

#[derive(Clone, Default)]
pub struct KernelBuilder {
    registry: FilterRegistry,
    plugins: BTreeMap<String, KernelPlugin>,
    chat: Option<Arc<dyn ChatCompletion>>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat_completion(mut self, service: Arc<dyn ChatCompletion>) -> Self {
        self.chat = Some(service);
        self
    }

    /// Append a hook; registration order is execution order
    pub fn register(mut self, hook: Hook) -> Self {
        self.registry.register(hook);
        self
    }

    pub fn add_function_filter(self, filter: Arc<dyn FunctionFilter>) -> Self {
        self.register(Hook::Function(filter))
    }

    pub fn add_prompt_filter(self, filter: Arc<dyn PromptFilter>) -> Self {
        self.register(Hook::Prompt(filter))
    }

    /// Add a plugin, replacing any plugin with the same name
    pub fn add_plugin(mut self, plugin: KernelPlugin) -> Self {
        self.plugins.insert(plugin.name().to_string(), plugin);
        self
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn build(self) -> Kernel {
        info!(
            function_filters = self.registry.len(HookKind::Function),
            prompt_filters = self.registry.len(HookKind::Prompt),
            plugins = self.plugins.len(),
            "Kernel built"
        );
        Kernel {
            pipeline: self.registry.freeze(),
            plugins: Arc::new(self.plugins),
            chat: self.chat,
        }
    }
}

#[derive(Clone)]
pub struct Kernel {
    pipeline: FilterPipeline,
    plugins: Arc<BTreeMap<String, KernelPlugin>>,
    chat: Option<Arc<dyn ChatCompletion>>,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Builder pre-populated with this kernel's filters, plugins and services
    pub fn to_builder(&self) -> KernelBuilder {
        KernelBuilder {
            registry: self.pipeline.to_registry(),
            plugins: (*self.plugins).clone(),
            chat: self.chat.clone(),
        }
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn chat_completion(&self) -> Option<&Arc<dyn ChatCompletion>> {
        self.chat.as_ref()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &KernelPlugin> {
        self.plugins.values()
    }

    pub fn plugin(&self, name: &str) -> Result<&KernelPlugin, FilterError> {
        self.plugins
            .get(name)
            .ok_or_else(|| FilterError::PluginNotFound(name.to_string()))
    }

    /// Look up `plugin.function`
    pub fn function(&self, plugin: &str, function: &str) -> Result<FunctionHandle, FilterError> {
        self.plugin(plugin)?
            .function(function)
            .cloned()
            .ok_or_else(|| FilterError::FunctionNotFound {
                plugin: plugin.to_string(),
                function: function.to_string(),
            })
    }

    /// Invoke a function wrapped by the function filters
    pub async fn invoke(
        &self,
        function: &FunctionHandle,
        arguments: KernelArguments,
    ) -> Result<InvocationOutcome<FunctionResult>, FilterError> {
        let identity = function.identity().clone();
        debug!(function = %identity, arguments = arguments.len(), "Invoking function");

        let ctx = FunctionInvokingContext::new(identity.clone(), arguments);
        self.pipeline
            .function_chain()
            .invoke(ctx, |args| function.function().invoke(self, &identity, args))
            .await
    }

    /// Look up and invoke `plugin.function`
    pub async fn invoke_by_name(
        &self,
        plugin: &str,
        function: &str,
        arguments: KernelArguments,
    ) -> Result<InvocationOutcome<FunctionResult>, FilterError> {
        let handle = self.function(plugin, function)?;
        self.invoke(&handle, arguments).await
    }

    /// Render a prompt wrapped by the prompt filters
    pub async fn render_prompt(
        &self,
        function: &FunctionIdentity,
        arguments: KernelArguments,
        renderer: &dyn PromptRenderer,
    ) -> Result<InvocationOutcome<String>, FilterError> {
        self.pipeline
            .render_prompt(function.clone(), arguments, renderer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{FunctionInvokedContext, PromptRenderingContext};
    use crate::llm::EchoCompletion;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl FunctionFilter for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn on_function_invoked(&self, ctx: &mut FunctionInvokedContext) -> Result<()> {
            let upper = ctx.result().to_string().to_uppercase();
            ctx.set_result_value(upper);
            Ok(())
        }
    }

    struct CancelPrompt;

    #[async_trait]
    impl PromptFilter for CancelPrompt {
        fn name(&self) -> &str {
            "cancel-prompt"
        }

        async fn on_prompt_rendering(&self, ctx: &mut PromptRenderingContext) -> Result<()> {
            ctx.cancel();
            Ok(())
        }
    }

    fn echo_plugin() -> KernelPlugin {
        let echo: Arc<dyn KernelFunction> = Arc::new(NativeFunction::new("Echo", |args| async move {
            Ok(args.get("input").cloned().unwrap_or_default())
        }));
        let ask: Arc<dyn KernelFunction> =
            Arc::new(PromptFunction::from_prompt("Ask", "What is Seattle"));
        KernelPlugin::from_functions("MyPlugin", vec![echo, ask])
    }

    #[tokio::test]
    async fn test_invoke_by_name_runs_native_function() {
        let kernel = Kernel::builder().add_plugin(echo_plugin()).build();

        let result = kernel
            .invoke_by_name("MyPlugin", "Echo", KernelArguments::with_input("hi"))
            .await
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(result.value(), &json!("hi"));
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let kernel = Kernel::builder().add_plugin(echo_plugin()).build();

        assert!(matches!(
            kernel.function("Nope", "Echo"),
            Err(FilterError::PluginNotFound(_))
        ));
        assert!(matches!(
            kernel.function("MyPlugin", "Nope"),
            Err(FilterError::FunctionNotFound { .. })
        ));
        assert_eq!(
            kernel.function("MyPlugin", "Echo").unwrap().identity(),
            &FunctionIdentity::in_plugin("MyPlugin", "Echo")
        );
    }

    #[tokio::test]
    async fn test_prompt_function_uses_chat_service() {
        let kernel = Kernel::builder()
            .with_chat_completion(Arc::new(EchoCompletion::new()))
            .add_plugin(echo_plugin())
            .build();

        let result = kernel
            .invoke_by_name("MyPlugin", "Ask", KernelArguments::new())
            .await
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(result.value(), &json!("What is Seattle"));
        assert_eq!(result.metadata()["RenderedPrompt"], "What is Seattle");
        assert_eq!(result.metadata()["Usage"]["input_tokens"], 3);
        assert_eq!(result.metadata()["Arguments"], json!({}));
    }

    #[tokio::test]
    async fn test_prompt_function_without_service_fails() {
        let kernel = Kernel::builder().add_plugin(echo_plugin()).build();

        let err = kernel
            .invoke_by_name("MyPlugin", "Ask", KernelArguments::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FilterError::MissingService(_)));
    }

    struct RejectPrompt;

    #[async_trait]
    impl PromptFilter for RejectPrompt {
        fn name(&self) -> &str {
            "reject-prompt"
        }

        async fn on_prompt_rendering(&self, _ctx: &mut PromptRenderingContext) -> Result<()> {
            anyhow::bail!("prompt rejected")
        }
    }

    #[tokio::test]
    async fn test_prompt_filter_error_surfaces_as_hook_error() {
        let kernel = Kernel::builder()
            .with_chat_completion(Arc::new(EchoCompletion::new()))
            .add_prompt_filter(Arc::new(RejectPrompt))
            .add_plugin(echo_plugin())
            .build();

        let err = kernel
            .invoke_by_name("MyPlugin", "Ask", KernelArguments::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FilterError::Hook {
                kind: HookKind::Prompt,
                stage: crate::hooks::HookStage::Before,
                ..
            }
        ));
        assert_eq!(err.hook_name(), Some("reject-prompt"));
    }

    #[tokio::test]
    async fn test_prompt_cancellation_cancels_function() {
        let kernel = Kernel::builder()
            .with_chat_completion(Arc::new(EchoCompletion::new()))
            .add_prompt_filter(Arc::new(CancelPrompt))
            .add_function_filter(Arc::new(Upper))
            .add_plugin(echo_plugin())
            .build();

        let outcome = kernel
            .invoke_by_name("MyPlugin", "Ask", KernelArguments::new())
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_to_builder_leaves_original_kernel_untouched() {
        let kernel = Kernel::builder().add_plugin(echo_plugin()).build();
        let extended = kernel.to_builder().add_function_filter(Arc::new(Upper)).build();

        let args = KernelArguments::with_input("quiet");
        let plain = kernel
            .invoke_by_name("MyPlugin", "Echo", args.clone())
            .await
            .unwrap()
            .completed()
            .unwrap();
        let loud = extended
            .invoke_by_name("MyPlugin", "Echo", args)
            .await
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(plain.value(), &json!("quiet"));
        assert_eq!(loud.value(), &json!("QUIET"));
        assert!(kernel.pipeline().function_chain().is_empty());
    }
}
