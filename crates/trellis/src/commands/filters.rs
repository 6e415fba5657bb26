use crate::commands::run::build_kernel;
use crate::config::Config;
use anyhow::Result;
use trellis_filters::Transcript;
use trellis_runtime::HookKind;

/// Print the filters the config registers, in execution order
pub fn execute(config: &Config) -> Result<()> {
    let kernel = build_kernel(config, &Transcript::new());
    let registry = kernel.pipeline().to_registry();

    for kind in [HookKind::Function, HookKind::Prompt] {
        println!("{} filters:", kind);
        for (i, name) in registry.names(kind).iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }
    Ok(())
}
