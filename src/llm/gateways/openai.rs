//! OpenAI Gateway for LLM interactions.
//!
//! This module provides a gateway for OpenAI's chat completions API. It handles
//! multimodal user messages, tool definitions and the parameter differences between
//! chat and reasoning models.

use crate::error::{ConnoisseurError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{adapt_messages_to_openai, convert_tool_calls};
use crate::llm::gateways::openai_model_registry::{get_model_registry, ModelType};
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use crate::llm::tools::LlmTool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for connecting to OpenAI API.
///
/// The API key comes from the user's session, never from the environment.
#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Gateway for OpenAI LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Adapt parameters based on model type and capabilities.
    fn adapt_parameters_for_model(
        &self,
        model: &str,
        config: &CompletionConfig,
    ) -> (HashMap<String, Value>, bool) {
        let registry = get_model_registry();
        let capabilities = registry.get_model_capabilities(model);

        let mut params = HashMap::new();

        debug!(
            model = model,
            model_type = ?capabilities.model_type,
            supports_tools = capabilities.supports_tools,
            "Adapting parameters for model"
        );

        let max_tokens = match capabilities.max_output_tokens {
            Some(limit) => config.max_tokens.min(limit as usize),
            None => config.max_tokens,
        };
        params.insert(
            capabilities.get_token_limit_param().to_string(),
            serde_json::json!(max_tokens),
        );

        if capabilities.supports_temperature(config.temperature) {
            params.insert("temperature".to_string(), serde_json::json!(config.temperature));
        } else if capabilities.supported_temperatures.as_ref().is_some_and(|t| t.is_empty()) {
            warn!(
                model = model,
                requested_temperature = config.temperature,
                "Model does not support temperature parameter at all"
            );
        } else {
            warn!(
                model = model,
                requested_temperature = config.temperature,
                default_temperature = 1.0,
                "Model does not support requested temperature, using default"
            );
            params.insert("temperature".to_string(), serde_json::json!(1.0));
        }

        if let Some(top_p) = config.top_p {
            if capabilities.model_type == ModelType::Chat {
                params.insert("top_p".to_string(), serde_json::json!(top_p));
            }
        }

        (params, capabilities.supports_tools)
    }
}

#[async_trait]
impl LlmGateway for OpenAIGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse> {
        info!("Delegating to OpenAI for completion");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let has_images = messages
            .iter()
            .any(|m| m.image_paths.as_ref().is_some_and(|p| !p.is_empty()));
        if has_images && !get_model_registry().get_model_capabilities(model).supports_vision {
            warn!(model = model, "Sending images to a model not registered for vision");
        }

        let openai_messages = adapt_messages_to_openai(messages)?;
        let (adapted_params, supports_tools) = self.adapt_parameters_for_model(model, config);

        let mut body = serde_json::json!({
            "model": model,
            "messages": openai_messages,
        });

        for (key, value) in adapted_params {
            body[key] = value;
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            if supports_tools {
                let tool_defs: Vec<_> = tools.iter().map(|t| t.descriptor()).collect();
                body["tools"] = serde_json::to_value(tool_defs)?;
            } else {
                warn!(model = model, "Model does not support tools, ignoring tool configuration");
            }
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConnoisseurError::GatewayError(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        let message = &response_body["choices"][0]["message"];

        let content = message["content"].as_str().map(String::from);

        let tool_calls = match message["tool_calls"].as_array() {
            Some(calls) => convert_tool_calls(calls),
            None => vec![],
        };

        Ok(LlmGatewayResponse {
            content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;
    use serde_json::json;

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAIConfig::new("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains(DEFAULT_BASE_URL));
    }

    fn gateway(api_key: &str, base_url: &str) -> OpenAIGateway {
        OpenAIGateway::with_config(OpenAIConfig {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    #[test]
    fn test_gateway_with_config() {
        let gateway = gateway("key", "https://custom.com");
        assert_eq!(gateway.config.api_key, "key");
        assert_eq!(gateway.config.base_url, "https://custom.com");
        assert_eq!(gateway.config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_adapt_parameters_chat_model() {
        let gateway = gateway("key", DEFAULT_BASE_URL);
        let config = CompletionConfig {
            temperature: 0.3,
            max_tokens: 4000,
            top_p: Some(0.9),
        };

        let (params, supports_tools) = gateway.adapt_parameters_for_model("gpt-4o", &config);

        assert_eq!(params["max_tokens"], json!(4000));
        assert!(!params.contains_key("max_completion_tokens"));
        assert_eq!(params["temperature"], json!(0.3f32));
        assert_eq!(params["top_p"], json!(0.9f32));
        assert!(supports_tools);
    }

    #[test]
    fn test_adapt_parameters_reasoning_model() {
        let gateway = gateway("key", DEFAULT_BASE_URL);
        let config = CompletionConfig::default();

        let (params, _) = gateway.adapt_parameters_for_model("o3-mini", &config);

        assert!(!params.contains_key("max_tokens"));
        assert_eq!(params["max_completion_tokens"], json!(16384));
        // o3 rejects temperature entirely
        assert!(!params.contains_key("temperature"));
    }

    #[test]
    fn test_adapt_parameters_caps_output_tokens() {
        let gateway = gateway("key", DEFAULT_BASE_URL);
        let config = CompletionConfig {
            max_tokens: 1_000_000,
            ..Default::default()
        };

        let (params, _) = gateway.adapt_parameters_for_model("gpt-4o", &config);

        assert_eq!(params["max_tokens"], json!(16384));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o"})))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Likely Impressionism."}}]}"#)
            .create_async()
            .await;

        let gateway = gateway("test-key", &server.url());
        let messages = vec![LlmMessage::user("Hi")];

        let response = gateway
            .complete("gpt-4o", &messages, None, &CompletionConfig::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, Some("Likely Impressionism.".to_string()));
        assert!(response.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_complete_with_tool_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"search_google","arguments":"{\"query\": \"Monet\"}"}}]}}]}"#)
            .create_async()
            .await;

        let gateway = gateway("test-key", &server.url());
        let messages = vec![LlmMessage::user("Find links")];

        let response = gateway
            .complete("gpt-4o", &messages, None, &CompletionConfig::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.content.is_none());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "search_google");
        assert_eq!(response.tool_calls[0].arguments["query"], json!("Monet"));
    }

    #[tokio::test]
    async fn test_complete_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("Incorrect API key provided")
            .create_async()
            .await;

        let gateway = gateway("bad-key", &server.url());
        let messages = vec![LlmMessage::user("Hi")];

        let result = gateway.complete("gpt-4o", &messages, None, &CompletionConfig::default()).await;

        mock.assert_async().await;
        match result {
            Err(ConnoisseurError::GatewayError(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Incorrect API key provided"));
            }
            other => panic!("Expected GatewayError, got {:?}", other.map(|_| ())),
        }
    }
}
