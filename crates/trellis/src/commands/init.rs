use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Trellis Configuration

[kernel]
plugin = "MyPlugin"
function = "MyFunction"
prompt = "What is Seattle"
reply_prefix = ""

[filters]
# Logging filters, run in list order
function = ["FirstFunctionFilter", "SecondFunctionFilter"]
prompt = ["FirstPromptFilter"]
# Function names to cancel; set cancel_all to cancel everything
cancel = []
cancel_all = false
# safe_prompt = "Safe prompt"
# result_override = "new result value"

[filters.arguments]
# input = "new input"
"#;

/// Write the default filter config; an existing file is never overwritten
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists; edit it or pass another path to `trellis init`",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote filter config to {0}; use it with `trellis run --config {0}`",
        path.display()
    );
    Ok(())
}
