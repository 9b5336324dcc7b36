pub mod openai;
pub mod openai_messages_adapter;
pub mod openai_model_registry;

pub use openai::{OpenAIConfig, OpenAIGateway};
pub use openai_model_registry::{
    get_model_registry, ModelCapabilities, ModelType, OpenAIModelRegistry,
};
