pub mod echo;
pub mod provider;
pub mod types;

pub use echo::EchoCompletion;
pub use provider::ChatCompletion;
pub use types::{ChatResponse, Usage};
