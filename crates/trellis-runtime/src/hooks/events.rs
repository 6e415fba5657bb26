use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation kinds a filter can wrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookKind {
    /// Function invocation
    Function,
    /// Prompt rendering
    Prompt,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Function => f.write_str("function"),
            HookKind::Prompt => f.write_str("prompt"),
        }
    }
}

/// Side of the wrapped operation a callback runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookStage {
    Before,
    After,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Before => f.write_str("pre-execution"),
            HookStage::After => f.write_str("post-execution"),
        }
    }
}

/// Per-invocation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Pending,
    PreHooksRunning,
    Cancelled,
    OperationRunning,
    PostHooksRunning,
    Completed,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationState::Cancelled | InvocationState::Completed)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: InvocationState) -> bool {
        use InvocationState::*;
        matches!(
            (self, next),
            (Pending, PreHooksRunning)
                | (PreHooksRunning, Cancelled)
                | (PreHooksRunning, OperationRunning)
                | (OperationRunning, Cancelled)
                | (OperationRunning, PostHooksRunning)
                | (PostHooksRunning, Completed)
        )
    }
}

/// Terminal outcome of one invocation. Cancellation is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> InvocationOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvocationOutcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            InvocationOutcome::Completed(value) => Some(value),
            InvocationOutcome::Cancelled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> InvocationOutcome<U> {
        match self {
            InvocationOutcome::Completed(value) => InvocationOutcome::Completed(f(value)),
            InvocationOutcome::Cancelled => InvocationOutcome::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        use InvocationState::*;
        assert!(Pending.can_transition_to(PreHooksRunning));
        assert!(PreHooksRunning.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(OperationRunning));
        assert!(!Pending.can_transition_to(Completed));
        assert!(Cancelled.is_terminal());
        assert!(Completed.is_terminal());
        assert!(!PostHooksRunning.is_terminal());
    }

    #[test]
    fn test_outcome_map() {
        let done = InvocationOutcome::Completed(2).map(|n| n * 2);
        assert_eq!(done.completed(), Some(4));

        let cancelled: InvocationOutcome<u32> = InvocationOutcome::Cancelled;
        assert!(cancelled.map(|n| n + 1).is_cancelled());
    }
}
