pub mod argument_filter;
pub mod cancel_filter;
pub mod logging_filter;
pub mod override_filter;

pub use argument_filter::ArgumentOverrideFilter;
pub use cancel_filter::CancelFilter;
pub use logging_filter::{LoggingFunctionFilter, LoggingPromptFilter, Transcript};
pub use override_filter::{PromptOverrideFilter, ResultOverrideFilter};

use std::sync::Arc;
use trellis_runtime::KernelBuilder;

/// Register one logging filter per name, function filters first, in list order.
pub fn register_logging_filters(
    mut builder: KernelBuilder,
    function_filters: &[String],
    prompt_filters: &[String],
    transcript: &Transcript,
) -> KernelBuilder {
    for name in function_filters {
        let filter = LoggingFunctionFilter::new(name.as_str()).with_transcript(transcript.clone());
        builder = builder.add_function_filter(Arc::new(filter));
    }
    for name in prompt_filters {
        let filter = LoggingPromptFilter::new(name.as_str()).with_transcript(transcript.clone());
        builder = builder.add_prompt_filter(Arc::new(filter));
    }
    builder
}
