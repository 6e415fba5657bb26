use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::function::{FunctionHandle, KernelFunction};

/// Named group of functions
#[derive(Clone, Debug)]
pub struct KernelPlugin {
    name: String,
    functions: BTreeMap<String, FunctionHandle>,
}

impl KernelPlugin {
    /// Create a plugin; a later function with an already used name replaces the earlier one
    pub fn from_functions(
        name: impl Into<String>,
        functions: impl IntoIterator<Item = Arc<dyn KernelFunction>>,
    ) -> Self {
        let name = name.into();
        let mut map = BTreeMap::new();
        for function in functions {
            let handle = FunctionHandle::in_plugin(&name, function);
            let key = handle.identity().name.clone();
            if map.insert(key.clone(), handle).is_some() {
                warn!(plugin = %name, function = %key, "Duplicate function name, keeping the last one");
            }
        }
        Self {
            name,
            functions: map,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self, name: &str) -> Option<&FunctionHandle> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionHandle> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
