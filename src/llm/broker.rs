use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use crate::llm::tools::LlmTool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on tool executions within one `generate` call
pub const DEFAULT_TOOL_CALL_LIMIT: usize = 10;

/// Main interface for LLM interactions
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    tool_call_limit: usize,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
            tool_call_limit: DEFAULT_TOOL_CALL_LIMIT,
        }
    }

    /// Cap the number of tool executions per `generate` call
    pub fn with_tool_call_limit(mut self, limit: usize) -> Self {
        self.tool_call_limit = limit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text response from LLM
    ///
    /// Tool calls requested by the model are executed and their output fed back until
    /// the model answers in text. Once `tool_call_limit` executions have happened the
    /// tools are withdrawn, so the next completion has to answer with what it has.
    pub async fn generate(
        &self,
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        correlation_id: Option<&str>,
    ) -> Result<String> {
        let config = CompletionConfig::default();
        let correlation_id = correlation_id.unwrap_or("-");
        let mut current_messages = messages.to_vec();
        let mut tool_calls_made = 0usize;

        loop {
            let offered_tools = tools.filter(|_| tool_calls_made < self.tool_call_limit);

            debug!(
                correlation_id = correlation_id,
                model = %self.model,
                messages = current_messages.len(),
                tools_offered = offered_tools.map_or(0, |t| t.len()),
                "Requesting completion"
            );

            let response = self
                .gateway
                .complete(&self.model, &current_messages, offered_tools, &config)
                .await?;

            let Some(available) = offered_tools.filter(|_| !response.tool_calls.is_empty()) else {
                if !response.tool_calls.is_empty() {
                    warn!(
                        correlation_id = correlation_id,
                        "LLM requested tool calls but no tools are available"
                    );
                }
                return Ok(response.content.unwrap_or_default());
            };

            info!(
                correlation_id = correlation_id,
                "Tool calls requested: {}",
                response.tool_calls.len()
            );

            let remaining = self.tool_call_limit - tool_calls_made;
            let accepted: Vec<_> = response.tool_calls.into_iter().take(remaining).collect();
            current_messages.push(LlmMessage::assistant_tool_calls(accepted.clone()));

            for tool_call in &accepted {
                let output = match available.iter().find(|t| t.matches(&tool_call.name)) {
                    Some(tool) => {
                        info!(correlation_id = correlation_id, "Executing tool: {}", tool_call.name);
                        serde_json::to_string(&tool.run(&tool_call.arguments).await?)?
                    }
                    None => {
                        warn!(correlation_id = correlation_id, "Tool not found: {}", tool_call.name);
                        format!("Error: tool '{}' is not available", tool_call.name)
                    }
                };

                current_messages.push(LlmMessage::tool_result(tool_call, output));
                tool_calls_made += 1;
            }

            if tool_calls_made >= self.tool_call_limit {
                info!(
                    correlation_id = correlation_id,
                    limit = self.tool_call_limit,
                    "Tool call limit reached, requesting final answer"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::{LlmGatewayResponse, LlmToolCall};
    use crate::llm::tools::{FunctionDescriptor, ToolDescriptor};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Mock gateway replaying canned responses and recording what it was offered
    struct MockGateway {
        responses: Vec<LlmGatewayResponse>,
        call_count: Mutex<usize>,
        tools_offered: Mutex<Vec<usize>>,
        last_messages: Mutex<Vec<LlmMessage>>,
    }

    impl MockGateway {
        fn new(responses: Vec<LlmGatewayResponse>) -> Self {
            Self {
                responses,
                call_count: Mutex::new(0),
                tools_offered: Mutex::new(vec![]),
                last_messages: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn complete(
            &self,
            _model: &str,
            messages: &[LlmMessage],
            tools: Option<&[Box<dyn LlmTool>]>,
            _config: &CompletionConfig,
        ) -> Result<LlmGatewayResponse> {
            let mut count = self.call_count.lock().unwrap();
            let idx = *count;
            *count += 1;
            self.tools_offered.lock().unwrap().push(tools.map_or(0, |t| t.len()));
            *self.last_messages.lock().unwrap() = messages.to_vec();

            Ok(self.responses.get(idx).cloned().unwrap_or(LlmGatewayResponse {
                content: Some("default response".to_string()),
                tool_calls: vec![],
            }))
        }
    }

    struct CountingTool {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmTool for CountingTool {
        async fn run(&self, _args: &HashMap<String, Value>) -> Result<Value> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({"search_results": []}))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                r#type: "function".to_string(),
                function: FunctionDescriptor {
                    name: "search_google".to_string(),
                    description: "A mock search".to_string(),
                    parameters: serde_json::json!({}),
                },
            }
        }
    }

    fn text(content: &str) -> LlmGatewayResponse {
        LlmGatewayResponse {
            content: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    fn search_call(id: &str) -> LlmGatewayResponse {
        LlmGatewayResponse {
            content: None,
            tool_calls: vec![LlmToolCall {
                id: Some(id.to_string()),
                name: "search_google".to_string(),
                arguments: HashMap::new(),
            }],
        }
    }

    fn counting_tools() -> (Vec<Box<dyn LlmTool>>, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let tools: Vec<Box<dyn LlmTool>> = vec![Box::new(CountingTool { runs: runs.clone() })];
        (tools, runs)
    }

    #[tokio::test]
    async fn test_broker_new() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let broker = LlmBroker::new("gpt-4o", gateway);
        assert_eq!(broker.model(), "gpt-4o");
        assert_eq!(broker.tool_call_limit, DEFAULT_TOOL_CALL_LIMIT);
    }

    #[tokio::test]
    async fn test_generate_simple_response() {
        let gateway = Arc::new(MockGateway::new(vec![text("Hello, World!")]));
        let broker = LlmBroker::new("gpt-4o", gateway);

        let messages = vec![LlmMessage::user("Hi")];
        let result = broker.generate(&messages, None, None).await.unwrap();

        assert_eq!(result, "Hello, World!");
    }

    #[tokio::test]
    async fn test_generate_empty_response_content() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse::default()]));
        let broker = LlmBroker::new("gpt-4o", gateway);

        let result = broker.generate(&[LlmMessage::user("Hi")], None, None).await.unwrap();

        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_generate_with_tool_call() {
        let gateway = Arc::new(MockGateway::new(vec![search_call("call_1"), text("After tool")]));
        let broker = LlmBroker::new("gpt-4o", gateway.clone());
        let (tools, runs) = counting_tools();

        let result = broker
            .generate(&[LlmMessage::user("Search")], Some(&tools), Some("corr-1"))
            .await
            .unwrap();

        assert_eq!(result, "After tool");
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // user, assistant tool call, tool result
        let sent = gateway.last_messages.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].content.as_deref(), Some(r#"{"search_results":[]}"#));
    }

    #[tokio::test]
    async fn test_generate_with_tool_call_no_tools_provided() {
        let mut response = search_call("call_1");
        response.content = Some("fallback".to_string());
        let gateway = Arc::new(MockGateway::new(vec![response]));
        let broker = LlmBroker::new("gpt-4o", gateway);

        let result = broker.generate(&[LlmMessage::user("Search")], None, None).await.unwrap();

        assert_eq!(result, "fallback");
    }

    #[tokio::test]
    async fn test_tool_call_limit_withdraws_tools() {
        let gateway = Arc::new(MockGateway::new(vec![
            search_call("call_1"),
            search_call("call_2"),
            search_call("call_3"),
            text("Final links"),
        ]));
        let broker = LlmBroker::new("gpt-4o", gateway.clone()).with_tool_call_limit(3);
        let (tools, runs) = counting_tools();

        let result = broker
            .generate(&[LlmMessage::user("Search")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "Final links");
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(*gateway.tools_offered.lock().unwrap(), vec![1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_tool_call_limit_truncates_parallel_calls() {
        let mut many = search_call("call_1");
        for i in 2..=5 {
            many.tool_calls.push(LlmToolCall {
                id: Some(format!("call_{}", i)),
                name: "search_google".to_string(),
                arguments: HashMap::new(),
            });
        }
        let gateway = Arc::new(MockGateway::new(vec![many, text("Done")]));
        let broker = LlmBroker::new("gpt-4o", gateway).with_tool_call_limit(3);
        let (tools, runs) = counting_tools();

        let result = broker
            .generate(&[LlmMessage::user("Search")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "Done");
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let mut response = search_call("call_1");
        response.tool_calls[0].name = "get_weather".to_string();
        let gateway = Arc::new(MockGateway::new(vec![response, text("Recovered")]));
        let broker = LlmBroker::new("gpt-4o", gateway.clone());
        let (tools, runs) = counting_tools();

        let result = broker
            .generate(&[LlmMessage::user("Search")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "Recovered");
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        let sent = gateway.last_messages.lock().unwrap();
        assert!(sent[2].content.as_deref().unwrap().contains("get_weather"));
    }
}
