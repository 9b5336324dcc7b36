pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod report;
pub mod web;

pub use error::{ConnoisseurError, InputError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::error::{ConnoisseurError, InputError, Result};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::tools::{FunctionDescriptor, LlmTool, SerpApiTool, ToolDescriptor};
    pub use crate::llm::{CompletionConfig, LlmBroker, LlmGateway, LlmMessage, MessageRole};
    pub use crate::report::{ArtworkProfile, Report, ReportGenerator, ReportPipeline};
}
