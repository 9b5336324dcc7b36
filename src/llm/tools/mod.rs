pub mod serp_search_tool;
mod tool;

pub use serp_search_tool::SerpApiTool;
pub use tool::{FunctionDescriptor, LlmTool, ToolDescriptor};
