pub mod arguments;
pub mod error;
pub mod hooks;
pub mod kernel;
pub mod llm;

pub use arguments::{FunctionIdentity, FunctionResult, KernelArguments};
pub use error::FilterError;
pub use hooks::{
    FilterPipeline, FilterRegistry, FunctionFilter, FunctionInvokedContext,
    FunctionInvokingContext, FunctionOperation, Hook, HookKind, HookStage, InvocationOutcome,
    InvocationState, PromptFilter, PromptRenderedContext, PromptRenderer, PromptRenderingContext,
};
pub use kernel::{
    FunctionHandle, Kernel, KernelBuilder, KernelFunction, KernelPlugin, NativeFunction,
    PromptFunction, TextPrompt,
};
pub use llm::{ChatCompletion, ChatResponse, EchoCompletion, Usage};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
