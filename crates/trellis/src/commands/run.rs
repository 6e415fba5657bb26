use crate::config::Config;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use trellis_filters::{
    register_logging_filters, ArgumentOverrideFilter, CancelFilter, PromptOverrideFilter,
    ResultOverrideFilter, Transcript,
};
use trellis_runtime::{
    EchoCompletion, FunctionResult, InvocationOutcome, Kernel, KernelArguments, KernelFunction,
    KernelPlugin, PromptFunction,
};

/// Build the kernel the config describes.
///
/// Function-level filters are registered on the builder; prompt-level filters
/// are appended afterwards by rebuilding from the first kernel.
pub fn build_kernel(config: &Config, transcript: &Transcript) -> Kernel {
    let function: Arc<dyn KernelFunction> = Arc::new(PromptFunction::from_prompt(
        config.kernel.function.as_str(),
        config.kernel.prompt.as_str(),
    ));
    let echo = EchoCompletion::new().with_prefix(config.kernel.reply_prefix.as_str());

    let mut builder = Kernel::builder()
        .with_chat_completion(Arc::new(echo))
        .add_plugin(KernelPlugin::from_functions(
            config.kernel.plugin.as_str(),
            vec![function],
        ));

    builder = register_logging_filters(builder, &config.filters.function, &[], transcript);

    if !config.filters.arguments.is_empty() {
        let overrides: KernelArguments = config
            .filters
            .arguments
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        builder = builder.add_function_filter(Arc::new(ArgumentOverrideFilter::new(overrides)));
    }

    if config.filters.cancel_all {
        builder = builder.add_function_filter(Arc::new(CancelFilter::all()));
    } else if !config.filters.cancel.is_empty() {
        builder =
            builder.add_function_filter(Arc::new(CancelFilter::new(config.filters.cancel.clone())));
    }

    if let Some(value) = &config.filters.result_override {
        builder = builder.add_function_filter(Arc::new(ResultOverrideFilter::new(value.as_str())));
    }

    let kernel = builder.build();

    let mut builder = register_logging_filters(
        kernel.to_builder(),
        &[],
        &config.filters.prompt,
        transcript,
    );
    if let Some(prompt) = &config.filters.safe_prompt {
        builder = builder.add_prompt_filter(Arc::new(PromptOverrideFilter::new(prompt.as_str())));
    }
    builder.build()
}

pub async fn execute(
    function: Option<String>,
    set: Vec<(String, String)>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let function = function.unwrap_or_else(|| config.kernel.function.clone());
    info!(plugin = %config.kernel.plugin, function = %function, "Running function");

    let transcript = Transcript::new();
    let kernel = build_kernel(config, &transcript);

    let arguments: KernelArguments = set.into_iter().collect();
    let outcome = kernel
        .invoke_by_name(&config.kernel.plugin, &function, arguments)
        .await
        .context(format!("Invocation of {}.{} failed", config.kernel.plugin, function))?;

    for line in transcript.lines() {
        println!("{}", line);
    }

    match outcome {
        InvocationOutcome::Completed(result) if json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        InvocationOutcome::Completed(result) => println!("{}", result),
        InvocationOutcome::Cancelled => println!("cancelled"),
    }

    Ok(())
}
