use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::context::{
    FunctionInvokedContext, FunctionInvokingContext, PromptRenderedContext, PromptRenderingContext,
};
use super::events::HookKind;

/// Filter wrapped around function invocation.
/// An error from either callback aborts the invocation.
#[async_trait]
pub trait FunctionFilter: Send + Sync {
    /// Filter name for logging and errors
    fn name(&self) -> &str;

    /// Runs before the function body; may rewrite arguments or cancel
    async fn on_function_invoking(&self, _ctx: &mut FunctionInvokingContext) -> Result<()> {
        Ok(())
    }

    /// Runs after the function body; may override the result value
    async fn on_function_invoked(&self, _ctx: &mut FunctionInvokedContext) -> Result<()> {
        Ok(())
    }
}

/// Filter wrapped around prompt rendering
#[async_trait]
pub trait PromptFilter: Send + Sync {
    fn name(&self) -> &str;

    /// Runs before rendering; may rewrite render inputs or cancel
    async fn on_prompt_rendering(&self, _ctx: &mut PromptRenderingContext) -> Result<()> {
        Ok(())
    }

    /// Runs after rendering; may replace the rendered text
    async fn on_prompt_rendered(&self, _ctx: &mut PromptRenderedContext) -> Result<()> {
        Ok(())
    }
}

/// A filter tagged with the operation kind it wraps
#[derive(Clone)]
pub enum Hook {
    Function(Arc<dyn FunctionFilter>),
    Prompt(Arc<dyn PromptFilter>),
}

impl Hook {
    pub fn kind(&self) -> HookKind {
        match self {
            Hook::Function(_) => HookKind::Function,
            Hook::Prompt(_) => HookKind::Prompt,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Hook::Function(filter) => filter.name(),
            Hook::Prompt(filter) => filter.name(),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

impl From<Arc<dyn FunctionFilter>> for Hook {
    fn from(filter: Arc<dyn FunctionFilter>) -> Self {
        Hook::Function(filter)
    }
}

impl From<Arc<dyn PromptFilter>> for Hook {
    fn from(filter: Arc<dyn PromptFilter>) -> Self {
        Hook::Prompt(filter)
    }
}
