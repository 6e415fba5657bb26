use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;
use trellis_runtime::{FunctionFilter, FunctionIdentity, FunctionInvokingContext};

/// Cancels invocations of blocked functions.
///
/// Entries match either the bare function name or `Plugin.Function`.
/// An empty blocklist cancels every invocation.
pub struct CancelFilter {
    blocklist: Vec<String>,
}

impl CancelFilter {
    pub fn new(blocklist: Vec<String>) -> Self {
        Self { blocklist }
    }

    /// Cancel everything
    pub fn all() -> Self {
        Self::new(Vec::new())
    }

    fn is_blocked(&self, function: &FunctionIdentity) -> bool {
        if self.blocklist.is_empty() {
            return true;
        }
        let qualified = function.to_string();
        self.blocklist
            .iter()
            .any(|entry| *entry == function.name || *entry == qualified)
    }
}

#[async_trait]
impl FunctionFilter for CancelFilter {
    fn name(&self) -> &str {
        "cancel"
    }

    async fn on_function_invoking(&self, ctx: &mut FunctionInvokingContext) -> Result<()> {
        if self.is_blocked(ctx.function()) {
            warn!(function = %ctx.function(), "Function blocked, cancelling invocation");
            ctx.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_runtime::KernelArguments;

    fn ctx(plugin: &str, name: &str) -> FunctionInvokingContext {
        FunctionInvokingContext::new(
            FunctionIdentity::in_plugin(plugin, name),
            KernelArguments::new(),
        )
    }

    #[tokio::test]
    async fn test_blocklist_matches_bare_and_qualified_names() {
        let filter = CancelFilter::new(vec!["Delete".into(), "Admin.Reset".into()]);

        let mut bare = ctx("Files", "Delete");
        filter.on_function_invoking(&mut bare).await.unwrap();
        assert!(bare.is_cancelled());

        let mut qualified = ctx("Admin", "Reset");
        filter.on_function_invoking(&mut qualified).await.unwrap();
        assert!(qualified.is_cancelled());

        let mut other_plugin = ctx("User", "Reset");
        filter.on_function_invoking(&mut other_plugin).await.unwrap();
        assert!(!other_plugin.is_cancelled());
    }

    #[tokio::test]
    async fn test_empty_blocklist_cancels_everything() {
        let mut c = ctx("MyPlugin", "MyFunction");
        CancelFilter::all().on_function_invoking(&mut c).await.unwrap();
        assert!(c.is_cancelled());
    }
}
