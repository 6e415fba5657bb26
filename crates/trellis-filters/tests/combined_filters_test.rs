use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use trellis_filters::{
    register_logging_filters, ArgumentOverrideFilter, CancelFilter, ResultOverrideFilter,
    Transcript,
};
use trellis_runtime::{Kernel, KernelArguments, KernelFunction, KernelPlugin, NativeFunction};

fn echo_plugin(calls: Arc<AtomicU32>) -> KernelPlugin {
    let echo: Arc<dyn KernelFunction> = Arc::new(NativeFunction::new("MyFunction", move |args| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(args.get("input").cloned().unwrap_or_default())
        }
    }));
    let delete: Arc<dyn KernelFunction> =
        Arc::new(NativeFunction::new("Delete", |_args| async { Ok(json!("deleted")) }));
    KernelPlugin::from_functions("MyPlugin", vec![echo, delete])
}

#[tokio::test]
async fn test_argument_override_then_result_override() {
    let calls = Arc::new(AtomicU32::new(0));
    let transcript = Transcript::new();
    let kernel = register_logging_filters(
        Kernel::builder().add_plugin(echo_plugin(calls.clone())),
        &["Audit".to_string()],
        &[],
        &transcript,
    )
    .add_function_filter(Arc::new(ArgumentOverrideFilter::set("input", "new input")))
    .add_function_filter(Arc::new(ResultOverrideFilter::new("new result value")))
    .build();

    let result = kernel
        .invoke_by_name("MyPlugin", "MyFunction", KernelArguments::with_input("old"))
        .await
        .unwrap()
        .completed()
        .unwrap();

    assert_eq!(result.value(), &json!("new result value"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        transcript.lines(),
        vec![
            "Audit.OnFunctionInvoking - MyPlugin.MyFunction",
            "Audit.OnFunctionInvoked - MyPlugin.MyFunction",
        ]
    );
}

#[tokio::test]
async fn test_cancel_filter_only_blocks_listed_function() {
    let calls = Arc::new(AtomicU32::new(0));
    let transcript = Transcript::new();
    let kernel = Kernel::builder()
        .add_plugin(echo_plugin(calls.clone()))
        .add_function_filter(Arc::new(CancelFilter::new(vec!["MyPlugin.Delete".into()])))
        .build();
    let kernel = register_logging_filters(
        kernel.to_builder(),
        &["Late".to_string()],
        &[],
        &transcript,
    )
    .build();

    let blocked = kernel
        .invoke_by_name("MyPlugin", "Delete", KernelArguments::new())
        .await
        .unwrap();
    assert!(blocked.is_cancelled());
    // Filters after the cancelling one never ran
    assert!(transcript.lines().is_empty());

    let allowed = kernel
        .invoke_by_name("MyPlugin", "MyFunction", KernelArguments::with_input("hi"))
        .await
        .unwrap();
    assert_eq!(allowed.completed().unwrap().value(), &json!("hi"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
