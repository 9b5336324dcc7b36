//! OpenAI Model Registry for managing model-specific configurations and capabilities.
//!
//! The pipeline mixes a vision chat model with a reasoning model, and the two accept
//! different request parameters. The registry records which is which so the gateway
//! can shape each request correctly.

use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

/// Classification of OpenAI model types based on their request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Models like o1, o3 that use max_completion_tokens
    Reasoning,
    /// Standard chat models that use max_tokens
    Chat,
}

/// Defines the capabilities and parameter requirements for a model.
#[derive(Debug, Clone)]
pub struct ModelCapabilities {
    pub model_type: ModelType,
    pub supports_tools: bool,
    pub supports_vision: bool,
    pub max_output_tokens: Option<u32>,
    /// None means all temperatures supported, empty vec means no temperature parameter allowed
    pub supported_temperatures: Option<Vec<f32>>,
}

impl ModelCapabilities {
    /// Get the correct parameter name for token limits based on model type.
    pub fn get_token_limit_param(&self) -> &'static str {
        if self.model_type == ModelType::Reasoning {
            "max_completion_tokens"
        } else {
            "max_tokens"
        }
    }

    /// Check if the model supports a specific temperature value.
    pub fn supports_temperature(&self, temperature: f32) -> bool {
        match &self.supported_temperatures {
            None => true,
            Some(temps) if temps.is_empty() => false,
            Some(temps) => temps.iter().any(|t| (*t - temperature).abs() < 0.01),
        }
    }
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            model_type: ModelType::Chat,
            supports_tools: true,
            supports_vision: false,
            max_output_tokens: None,
            supported_temperatures: None,
        }
    }
}

/// Registry for managing OpenAI model configurations and capabilities.
pub struct OpenAIModelRegistry {
    models: HashMap<String, ModelCapabilities>,
    pattern_mappings: Vec<(String, ModelType)>,
}

impl OpenAIModelRegistry {
    /// Create a new model registry with default models.
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
            pattern_mappings: Vec::new(),
        };
        registry.initialize_default_models();
        registry
    }

    fn initialize_default_models(&mut self) {
        let reasoning_models = [
            "o1",
            "o1-2024-12-17",
            "o1-mini",
            "o3",
            "o3-2025-04-16",
            "o3-mini",
            "o3-mini-2025-01-31",
            "o4-mini",
            "o4-mini-2025-04-16",
            "gpt-5",
            "gpt-5-mini",
            "gpt-5-nano",
        ];

        for model in reasoning_models {
            let is_gpt5 = model.starts_with("gpt-5");
            let is_o3_series = model.starts_with("o3");

            // o3 rejects the temperature parameter outright; the others only accept 1.0
            let supported_temps = if is_o3_series { Some(vec![]) } else { Some(vec![1.0]) };

            self.models.insert(
                model.to_string(),
                ModelCapabilities {
                    model_type: ModelType::Reasoning,
                    supports_tools: is_gpt5 || model.starts_with("o3") || model.starts_with("o4"),
                    supports_vision: is_gpt5 || model == "o1" || model.starts_with("o4"),
                    max_output_tokens: Some(if is_gpt5 { 128000 } else { 100000 }),
                    supported_temperatures: supported_temps,
                },
            );
        }

        let chat_models = [
            "chatgpt-4o-latest",
            "gpt-4",
            "gpt-4-turbo",
            "gpt-4.1",
            "gpt-4.1-mini",
            "gpt-4.1-nano",
            "gpt-4o",
            "gpt-4o-2024-08-06",
            "gpt-4o-2024-11-20",
            "gpt-4o-mini",
            "gpt-4o-mini-2024-07-18",
        ];

        for model in chat_models {
            let is_gpt41 = model.contains("gpt-4.1");
            let vision_support = model.contains("4o") || is_gpt41 || model == "gpt-4-turbo";

            let output_tokens = if is_gpt41 {
                32768
            } else if model.contains("4o") {
                16384
            } else {
                8192
            };

            self.models.insert(
                model.to_string(),
                ModelCapabilities {
                    model_type: ModelType::Chat,
                    supports_tools: true,
                    supports_vision: vision_support,
                    max_output_tokens: Some(output_tokens),
                    supported_temperatures: None,
                },
            );
        }

        // Checked in order, so the more specific prefixes come first
        for (pattern, model_type) in [
            ("gpt-5", ModelType::Reasoning),
            ("gpt-4", ModelType::Chat),
            ("chatgpt", ModelType::Chat),
            ("o1", ModelType::Reasoning),
            ("o3", ModelType::Reasoning),
            ("o4", ModelType::Reasoning),
        ] {
            self.pattern_mappings.push((pattern.to_string(), model_type));
        }
    }

    /// Get the capabilities for a specific model.
    pub fn get_model_capabilities(&self, model_name: &str) -> ModelCapabilities {
        if let Some(caps) = self.models.get(model_name) {
            return caps.clone();
        }

        let model_lower = model_name.to_lowercase();
        for (pattern, model_type) in &self.pattern_mappings {
            if model_lower.starts_with(pattern.as_str()) {
                warn!(
                    model = model_name,
                    pattern = pattern.as_str(),
                    inferred_type = ?model_type,
                    "Using pattern matching for unknown model"
                );
                return Self::default_capabilities_for_type(*model_type);
            }
        }

        warn!(model = model_name, "Unknown model, defaulting to chat model capabilities");
        Self::default_capabilities_for_type(ModelType::Chat)
    }

    fn default_capabilities_for_type(model_type: ModelType) -> ModelCapabilities {
        match model_type {
            ModelType::Reasoning => ModelCapabilities {
                model_type: ModelType::Reasoning,
                supports_tools: false,
                supports_vision: false,
                max_output_tokens: None,
                supported_temperatures: Some(vec![1.0]),
            },
            ModelType::Chat => ModelCapabilities::default(),
        }
    }
}

impl Default for OpenAIModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instance.
pub static MODEL_REGISTRY: LazyLock<OpenAIModelRegistry> = LazyLock::new(OpenAIModelRegistry::new);

/// Get the global OpenAI model registry instance.
pub fn get_model_registry() -> &'static OpenAIModelRegistry {
    &MODEL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_token_limit_param() {
        let reasoning = ModelCapabilities {
            model_type: ModelType::Reasoning,
            ..Default::default()
        };
        assert_eq!(reasoning.get_token_limit_param(), "max_completion_tokens");
        assert_eq!(ModelCapabilities::default().get_token_limit_param(), "max_tokens");
    }

    #[test]
    fn test_supports_temperature_restrictions() {
        let unrestricted = ModelCapabilities::default();
        assert!(unrestricted.supports_temperature(0.2));

        let only_one = ModelCapabilities {
            supported_temperatures: Some(vec![1.0]),
            ..Default::default()
        };
        assert!(only_one.supports_temperature(1.0));
        assert!(!only_one.supports_temperature(0.5));

        let none_allowed = ModelCapabilities {
            supported_temperatures: Some(vec![]),
            ..Default::default()
        };
        assert!(!none_allowed.supports_temperature(1.0));
    }

    #[test]
    fn test_pipeline_models() {
        let registry = OpenAIModelRegistry::new();

        let vision = registry.get_model_capabilities("gpt-4o");
        assert_eq!(vision.model_type, ModelType::Chat);
        assert!(vision.supports_vision);
        assert!(vision.supports_tools);

        let report = registry.get_model_capabilities("o3-mini");
        assert_eq!(report.model_type, ModelType::Reasoning);
        assert_eq!(report.supported_temperatures, Some(vec![]));
    }

    #[test]
    fn test_unknown_model_pattern_matching() {
        let registry = OpenAIModelRegistry::new();
        assert_eq!(
            registry.get_model_capabilities("gpt-4o-2099-01-01").model_type,
            ModelType::Chat
        );
        assert_eq!(registry.get_model_capabilities("o3-ultra").model_type, ModelType::Reasoning);
    }

    #[test]
    fn test_unknown_model_default() {
        let registry = OpenAIModelRegistry::new();
        let caps = registry.get_model_capabilities("llava-art");
        assert_eq!(caps.model_type, ModelType::Chat);
    }

    #[test]
    fn test_gpt5_family_is_reasoning() {
        let caps = get_model_registry().get_model_capabilities("gpt-5-mini");
        assert_eq!(caps.model_type, ModelType::Reasoning);
        assert_eq!(caps.get_token_limit_param(), "max_completion_tokens");
        assert_eq!(caps.supported_temperatures, Some(vec![1.0]));

        let gpt41 = get_model_registry().get_model_capabilities("gpt-4.1");
        assert_eq!(gpt41.model_type, ModelType::Chat);
    }
}
