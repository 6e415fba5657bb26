use std::sync::Arc;

use tracing::debug;

use super::events::HookKind;
use super::hook::{FunctionFilter, Hook, PromptFilter};
use super::pipeline::{FilterChain, FilterPipeline};

/// Setup-time registry of filters, organized by kind.
///
/// Insertion order is execution order. Freezing produces an immutable
/// `FilterPipeline`; later registrations do not affect pipelines already built.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    function: Vec<Arc<dyn FunctionFilter>>,
    prompt: Vec<Arc<dyn PromptFilter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to the list for its kind. Duplicates are kept.
    pub fn register(&mut self, hook: Hook) {
        debug!(hook = hook.name(), kind = %hook.kind(), "Registering filter");
        match hook {
            Hook::Function(filter) => self.function.push(filter),
            Hook::Prompt(filter) => self.prompt.push(filter),
        }
    }

    pub fn add_function_filter(&mut self, filter: Arc<dyn FunctionFilter>) {
        self.register(Hook::Function(filter));
    }

    pub fn add_prompt_filter(&mut self, filter: Arc<dyn PromptFilter>) {
        self.register(Hook::Prompt(filter));
    }

    pub fn len(&self, kind: HookKind) -> usize {
        match kind {
            HookKind::Function => self.function.len(),
            HookKind::Prompt => self.prompt.len(),
        }
    }

    /// Check if any hooks are registered for a kind
    pub fn has_hooks(&self, kind: HookKind) -> bool {
        self.len(kind) > 0
    }

    /// Names of the registered filters for a kind, in execution order
    pub fn names(&self, kind: HookKind) -> Vec<String> {
        match kind {
            HookKind::Function => self.function.iter().map(|f| f.name().to_string()).collect(),
            HookKind::Prompt => self.prompt.iter().map(|f| f.name().to_string()).collect(),
        }
    }

    /// Snapshot the current lists into an immutable pipeline
    pub fn freeze(&self) -> FilterPipeline {
        FilterPipeline::new(
            FilterChain::new(self.function.clone()),
            FilterChain::new(self.prompt.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl FunctionFilter for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[async_trait]
    impl PromptFilter for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_register_routes_by_kind() {
        let mut registry = FilterRegistry::new();
        registry.register(Hook::Function(Arc::new(Named("first"))));
        registry.register(Hook::Function(Arc::new(Named("second"))));
        registry.register(Hook::Prompt(Arc::new(Named("prompt"))));

        assert!(registry.has_hooks(HookKind::Function));
        assert_eq!(registry.names(HookKind::Function), vec!["first", "second"]);
        assert_eq!(registry.names(HookKind::Prompt), vec!["prompt"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = FilterRegistry::new();
        assert!(!registry.has_hooks(HookKind::Function));
        assert!(!registry.has_hooks(HookKind::Prompt));
        assert!(registry.freeze().function_chain().is_empty());
    }

    #[test]
    fn test_freeze_is_a_snapshot() {
        let mut registry = FilterRegistry::new();
        registry.add_function_filter(Arc::new(Named("early")));
        let pipeline = registry.freeze();

        registry.add_function_filter(Arc::new(Named("late")));

        assert_eq!(pipeline.function_chain().len(), 1);
        assert_eq!(registry.freeze().function_chain().len(), 2);
    }

    #[test]
    fn test_pipeline_round_trips_to_registry() {
        let mut registry = FilterRegistry::new();
        registry.add_function_filter(Arc::new(Named("a")));
        registry.add_prompt_filter(Arc::new(Named("b")));

        let copy = registry.freeze().to_registry();
        assert_eq!(copy.names(HookKind::Function), vec!["a"]);
        assert_eq!(copy.names(HookKind::Prompt), vec!["b"]);
    }
}
