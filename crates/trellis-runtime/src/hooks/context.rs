//! Mutable contexts handed to filters by exclusive reference.
//!
//! The function identity is fixed for the whole invocation: contexts expose it
//! through `&` accessors only.

use serde_json::{Map, Value};

use crate::arguments::{FunctionIdentity, FunctionResult, KernelArguments};

/// Before a function body runs
#[derive(Debug, Clone)]
pub struct FunctionInvokingContext {
    function: FunctionIdentity,
    arguments: KernelArguments,
    cancel: bool,
}

impl FunctionInvokingContext {
    pub fn new(function: FunctionIdentity, arguments: KernelArguments) -> Self {
        Self {
            function,
            arguments,
            cancel: false,
        }
    }

    pub fn function(&self) -> &FunctionIdentity {
        &self.function
    }

    pub fn arguments(&self) -> &KernelArguments {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut KernelArguments {
        &mut self.arguments
    }

    /// Stop the invocation after this filter returns
    pub fn cancel(&mut self) {
        self.cancel = true;
    }

    pub fn set_cancel(&mut self, cancel: bool) {
        self.cancel = cancel;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
    }

    pub(crate) fn into_invoked(self, result: FunctionResult) -> FunctionInvokedContext {
        FunctionInvokedContext {
            function: self.function,
            arguments: self.arguments,
            result,
        }
    }
}

/// After a function body returned
#[derive(Debug, Clone)]
pub struct FunctionInvokedContext {
    function: FunctionIdentity,
    arguments: KernelArguments,
    result: FunctionResult,
}

impl FunctionInvokedContext {
    pub fn function(&self) -> &FunctionIdentity {
        &self.function
    }

    /// Arguments the body actually ran with
    pub fn arguments(&self) -> &KernelArguments {
        &self.arguments
    }

    pub fn result(&self) -> &FunctionResult {
        &self.result
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        self.result.metadata()
    }

    /// Replace the value returned to the caller. Metadata is kept.
    pub fn set_result_value(&mut self, value: impl Into<Value>) {
        self.result.set_value(value.into());
    }

    pub(crate) fn into_result(self) -> FunctionResult {
        self.result
    }
}

/// Before a prompt is rendered
#[derive(Debug, Clone)]
pub struct PromptRenderingContext {
    function: FunctionIdentity,
    arguments: KernelArguments,
    cancel: bool,
}

impl PromptRenderingContext {
    pub fn new(function: FunctionIdentity, arguments: KernelArguments) -> Self {
        Self {
            function,
            arguments,
            cancel: false,
        }
    }

    pub fn function(&self) -> &FunctionIdentity {
        &self.function
    }

    pub fn arguments(&self) -> &KernelArguments {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut KernelArguments {
        &mut self.arguments
    }

    pub fn cancel(&mut self) {
        self.cancel = true;
    }

    pub fn set_cancel(&mut self, cancel: bool) {
        self.cancel = cancel;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
    }

    pub(crate) fn into_rendered(self, rendered_prompt: String) -> PromptRenderedContext {
        PromptRenderedContext {
            function: self.function,
            arguments: self.arguments,
            rendered_prompt,
        }
    }
}

/// After a prompt was rendered, before it is sent anywhere
#[derive(Debug, Clone)]
pub struct PromptRenderedContext {
    function: FunctionIdentity,
    arguments: KernelArguments,
    rendered_prompt: String,
}

impl PromptRenderedContext {
    pub fn function(&self) -> &FunctionIdentity {
        &self.function
    }

    pub fn arguments(&self) -> &KernelArguments {
        &self.arguments
    }

    pub fn rendered_prompt(&self) -> &str {
        &self.rendered_prompt
    }

    pub fn set_rendered_prompt(&mut self, prompt: impl Into<String>) {
        self.rendered_prompt = prompt.into();
    }

    pub(crate) fn into_prompt(self) -> String {
        self.rendered_prompt
    }
}
