//! Ordered before/after filter execution around an operation.
//!
//! One algorithm serves both operation kinds; `FilterKind` selects the filter
//! trait and context shapes at compile time.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use super::context::{
    FunctionInvokedContext, FunctionInvokingContext, PromptRenderedContext, PromptRenderingContext,
};
use super::events::{HookKind, HookStage, InvocationOutcome, InvocationState};
use super::hook::{FunctionFilter, PromptFilter};
use super::registry::FilterRegistry;
use crate::arguments::{FunctionIdentity, FunctionResult, KernelArguments};
use crate::error::FilterError;

/// Binds an operation kind to its filter trait and context types
pub trait FilterKind: Send + Sync + 'static {
    const KIND: HookKind;

    type Filter: ?Sized + Send + Sync;
    /// Pre-execution context
    type Before: Send;
    /// Post-execution context
    type After: Send;
    /// What the operation produces and the caller finally receives
    type Output: Send;

    fn filter_name(filter: &Self::Filter) -> &str;

    fn on_before<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::Before,
    ) -> BoxFuture<'a, Result<()>>;

    fn on_after<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::After,
    ) -> BoxFuture<'a, Result<()>>;

    fn function(ctx: &Self::Before) -> &FunctionIdentity;

    fn arguments(ctx: &Self::Before) -> &KernelArguments;

    fn is_cancelled(ctx: &Self::Before) -> bool;

    fn into_after(before: Self::Before, output: Self::Output) -> Self::After;

    fn into_output(after: Self::After) -> Self::Output;
}

/// Function invocation filters
pub enum FunctionKind {}

impl FilterKind for FunctionKind {
    const KIND: HookKind = HookKind::Function;

    type Filter = dyn FunctionFilter;
    type Before = FunctionInvokingContext;
    type After = FunctionInvokedContext;
    type Output = FunctionResult;

    fn filter_name(filter: &Self::Filter) -> &str {
        filter.name()
    }

    fn on_before<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::Before,
    ) -> BoxFuture<'a, Result<()>> {
        filter.on_function_invoking(ctx)
    }

    fn on_after<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::After,
    ) -> BoxFuture<'a, Result<()>> {
        filter.on_function_invoked(ctx)
    }

    fn function(ctx: &Self::Before) -> &FunctionIdentity {
        ctx.function()
    }

    fn arguments(ctx: &Self::Before) -> &KernelArguments {
        ctx.arguments()
    }

    fn is_cancelled(ctx: &Self::Before) -> bool {
        ctx.is_cancelled()
    }

    fn into_after(before: Self::Before, output: Self::Output) -> Self::After {
        before.into_invoked(output)
    }

    fn into_output(after: Self::After) -> Self::Output {
        after.into_result()
    }
}

/// Prompt rendering filters
pub enum PromptKind {}

impl FilterKind for PromptKind {
    const KIND: HookKind = HookKind::Prompt;

    type Filter = dyn PromptFilter;
    type Before = PromptRenderingContext;
    type After = PromptRenderedContext;
    type Output = String;

    fn filter_name(filter: &Self::Filter) -> &str {
        filter.name()
    }

    fn on_before<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::Before,
    ) -> BoxFuture<'a, Result<()>> {
        filter.on_prompt_rendering(ctx)
    }

    fn on_after<'a>(
        filter: &'a Self::Filter,
        ctx: &'a mut Self::After,
    ) -> BoxFuture<'a, Result<()>> {
        filter.on_prompt_rendered(ctx)
    }

    fn function(ctx: &Self::Before) -> &FunctionIdentity {
        ctx.function()
    }

    fn arguments(ctx: &Self::Before) -> &KernelArguments {
        ctx.arguments()
    }

    fn is_cancelled(ctx: &Self::Before) -> bool {
        ctx.is_cancelled()
    }

    fn into_after(before: Self::Before, output: Self::Output) -> Self::After {
        before.into_rendered(output)
    }

    fn into_output(after: Self::After) -> Self::Output {
        after.into_prompt()
    }
}

/// Immutable, ordered snapshot of the filters for one kind
pub struct FilterChain<K: FilterKind> {
    filters: Arc<[Arc<K::Filter>]>,
}

impl<K: FilterKind> Clone for FilterChain<K> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<K: FilterKind> FilterChain<K> {
    pub fn new(filters: Vec<Arc<K::Filter>>) -> Self {
        Self {
            filters: filters.into(),
        }
    }

    pub fn filters(&self) -> &[Arc<K::Filter>] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run pre-filters, the operation, then post-filters, in registration order.
    ///
    /// The operation receives the arguments as left by the last pre-filter and may
    /// itself report cancellation (a nested pipeline did). A cancelled invocation
    /// runs no post-filters. The first filter or operation error aborts the chain.
    pub async fn invoke<F, Fut>(
        &self,
        mut before: K::Before,
        operation: F,
    ) -> Result<InvocationOutcome<K::Output>, FilterError>
    where
        F: FnOnce(KernelArguments) -> Fut,
        Fut: Future<Output = Result<InvocationOutcome<K::Output>>>,
    {
        let function = K::function(&before).clone();
        let mut state = InvocationState::Pending;

        transition::<K>(&mut state, InvocationState::PreHooksRunning, &function);
        for filter in self.filters.iter() {
            let name = K::filter_name(filter);
            debug!(hook = name, kind = %K::KIND, function = %function, "Running pre-execution filter");

            if let Err(e) = K::on_before(filter, &mut before).await {
                warn!(hook = name, kind = %K::KIND, function = %function, error = %e, "Filter failed");
                return Err(FilterError::hook(name, K::KIND, HookStage::Before, e));
            }

            if K::is_cancelled(&before) {
                info!(hook = name, kind = %K::KIND, function = %function, "Invocation cancelled by filter");
                transition::<K>(&mut state, InvocationState::Cancelled, &function);
                return Ok(InvocationOutcome::Cancelled);
            }
        }

        transition::<K>(&mut state, InvocationState::OperationRunning, &function);
        let output = match operation(K::arguments(&before).clone()).await {
            Ok(InvocationOutcome::Completed(output)) => output,
            Ok(InvocationOutcome::Cancelled) => {
                info!(kind = %K::KIND, function = %function, "Operation reported cancellation");
                transition::<K>(&mut state, InvocationState::Cancelled, &function);
                return Ok(InvocationOutcome::Cancelled);
            }
            Err(e) => {
                warn!(kind = %K::KIND, function = %function, error = %e, "Operation failed");
                // A nested pipeline already classified its failure
                return Err(match e.downcast::<FilterError>() {
                    Ok(inner) => inner,
                    Err(e) => FilterError::operation(function.to_string(), K::KIND, e),
                });
            }
        };

        let mut after = K::into_after(before, output);

        transition::<K>(&mut state, InvocationState::PostHooksRunning, &function);
        for filter in self.filters.iter() {
            let name = K::filter_name(filter);
            debug!(hook = name, kind = %K::KIND, function = %function, "Running post-execution filter");

            if let Err(e) = K::on_after(filter, &mut after).await {
                warn!(hook = name, kind = %K::KIND, function = %function, error = %e, "Filter failed");
                return Err(FilterError::hook(name, K::KIND, HookStage::After, e));
            }
        }

        transition::<K>(&mut state, InvocationState::Completed, &function);
        Ok(InvocationOutcome::Completed(K::into_output(after)))
    }
}

fn transition<K: FilterKind>(
    state: &mut InvocationState,
    next: InvocationState,
    function: &FunctionIdentity,
) {
    debug_assert!(state.can_transition_to(next), "{:?} -> {:?}", state, next);
    debug!(kind = %K::KIND, function = %function, from = ?state, to = ?next, "Invocation state");
    *state = next;
}

/// Function body as seen by the pipeline
#[async_trait]
pub trait FunctionOperation: Send + Sync {
    async fn execute(&self, arguments: KernelArguments) -> Result<FunctionResult>;
}

/// Prompt render step as seen by the pipeline
#[async_trait]
pub trait PromptRenderer: Send + Sync {
    async fn render(&self, arguments: KernelArguments) -> Result<String>;
}

/// Both filter chains, frozen from a `FilterRegistry`
#[derive(Clone)]
pub struct FilterPipeline {
    function: FilterChain<FunctionKind>,
    prompt: FilterChain<PromptKind>,
}

impl FilterPipeline {
    pub fn new(function: FilterChain<FunctionKind>, prompt: FilterChain<PromptKind>) -> Self {
        Self { function, prompt }
    }

    pub fn function_chain(&self) -> &FilterChain<FunctionKind> {
        &self.function
    }

    pub fn prompt_chain(&self) -> &FilterChain<PromptKind> {
        &self.prompt
    }

    /// Invoke `operation` wrapped by the function filters
    pub async fn invoke_function(
        &self,
        function: FunctionIdentity,
        arguments: KernelArguments,
        operation: &dyn FunctionOperation,
    ) -> Result<InvocationOutcome<FunctionResult>, FilterError> {
        let ctx = FunctionInvokingContext::new(function, arguments);
        self.function
            .invoke(ctx, |args| async move {
                operation.execute(args).await.map(InvocationOutcome::Completed)
            })
            .await
    }

    /// Render a prompt wrapped by the prompt filters
    pub async fn render_prompt(
        &self,
        function: FunctionIdentity,
        arguments: KernelArguments,
        renderer: &dyn PromptRenderer,
    ) -> Result<InvocationOutcome<String>, FilterError> {
        let ctx = PromptRenderingContext::new(function, arguments);
        self.prompt
            .invoke(ctx, |args| async move {
                renderer.render(args).await.map(InvocationOutcome::Completed)
            })
            .await
    }

    /// Copy the filters back into an editable registry
    pub fn to_registry(&self) -> FilterRegistry {
        let mut registry = FilterRegistry::new();
        for filter in self.function.filters() {
            registry.add_function_filter(filter.clone());
        }
        for filter in self.prompt.filters() {
            registry.add_prompt_filter(filter.clone());
        }
        registry
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        FilterRegistry::new().freeze()
    }
}
