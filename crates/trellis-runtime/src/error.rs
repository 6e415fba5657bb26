//! Error types for the filter pipeline and kernel.

use crate::hooks::{HookKind, HookStage};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A filter callback returned an error; the rest of the pipeline was skipped
    #[error("{kind} filter '{hook}' failed during {stage}")]
    Hook {
        hook: String,
        kind: HookKind,
        stage: HookStage,
        #[source]
        source: BoxError,
    },

    /// The wrapped operation itself failed; post-execution filters did not run
    #[error("{kind} operation '{function}' failed")]
    Operation {
        function: String,
        kind: HookKind,
        #[source]
        source: BoxError,
    },

    #[error("Plugin '{0}' not found")]
    PluginNotFound(String),

    #[error("Function '{function}' not found in plugin '{plugin}'")]
    FunctionNotFound { plugin: String, function: String },

    #[error("No {0} service registered on the kernel")]
    MissingService(&'static str),
}

impl FilterError {
    pub(crate) fn hook(hook: &str, kind: HookKind, stage: HookStage, source: anyhow::Error) -> Self {
        FilterError::Hook {
            hook: hook.to_string(),
            kind,
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn operation(function: String, kind: HookKind, source: anyhow::Error) -> Self {
        FilterError::Operation {
            function,
            kind,
            source: source.into(),
        }
    }

    /// Name of the failing filter, if a filter failed
    pub fn hook_name(&self) -> Option<&str> {
        match self {
            FilterError::Hook { hook, .. } => Some(hook),
            _ => None,
        }
    }
}
