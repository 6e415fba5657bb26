pub mod context;
pub mod events;
pub mod hook;
pub mod pipeline;
pub mod registry;

pub use context::{
    FunctionInvokedContext, FunctionInvokingContext, PromptRenderedContext, PromptRenderingContext,
};
pub use events::{HookKind, HookStage, InvocationOutcome, InvocationState};
pub use hook::{FunctionFilter, Hook, PromptFilter};
pub use pipeline::{
    FilterChain, FilterKind, FilterPipeline, FunctionKind, FunctionOperation, PromptKind,
    PromptRenderer,
};
pub use registry::FilterRegistry;
