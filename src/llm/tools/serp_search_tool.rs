use crate::error::{ConnoisseurError, Result};
use crate::llm::tools::{FunctionDescriptor, LlmTool, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_RESULTS: u64 = 10;
const MAX_RESULTS: u64 = 20;
const TIMEOUT_SECONDS: u64 = 30;

/// A Google search result returned through SerpAPI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The title of the search result
    pub title: String,
    /// The URL of the search result
    pub url: String,
    /// A snippet/description of the search result
    pub snippet: String,
}

/// Summary card Google shows for well-known entities (artists, movements, museums)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGraph {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<SerpOrganicResult>,
    knowledge_graph: Option<SerpKnowledgeGraph>,
}

#[derive(Debug, Deserialize)]
struct SerpOrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpKnowledgeGraph {
    title: Option<String>,
    description: Option<String>,
}

/// Tool that lets the model run Google searches through SerpAPI
///
/// The research agent gets this as its only tool. Each call performs one query and
/// hands the organic results (and the knowledge graph card, if Google shows one) back
/// to the model as JSON.
///
/// # Examples
///
/// ```ignore
/// use art_connoisseur::llm::tools::serp_search_tool::SerpApiTool;
///
/// let tool = SerpApiTool::with_base_url("serp-key", "https://serpapi.com")?;
/// let mut args = HashMap::new();
/// args.insert("query".to_string(), serde_json::json!("Post-Impressionism Cézanne"));
///
/// let results = tool.run(&args).await?;
/// ```
#[derive(Clone)]
pub struct SerpApiTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiTool {
    /// Creates a SerpApiTool against the given endpoint (usually `https://serpapi.com`)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Perform the search
    async fn perform_search(
        &self,
        query: &str,
        num_results: u64,
    ) -> Result<(Vec<SearchResult>, Option<KnowledgeGraph>)> {
        let url = format!(
            "{}/search.json?engine=google&q={}&num={}&api_key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            num_results,
            urlencoding::encode(&self.api_key)
        );

        info!(query = query, num_results = num_results, "Calling SerpAPI Google search");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConnoisseurError::ApiError(format!(
                "SerpAPI request failed with status {} - {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        Self::parse_results(&body, num_results)
    }

    /// Parse the SerpAPI JSON payload
    fn parse_results(
        body: &str,
        num_results: u64,
    ) -> Result<(Vec<SearchResult>, Option<KnowledgeGraph>)> {
        let payload: SerpApiResponse = serde_json::from_str(body)?;

        if let Some(error) = payload.error {
            return Err(ConnoisseurError::ApiError(format!("SerpAPI error: {}", error)));
        }

        let results: Vec<SearchResult> = payload
            .organic_results
            .into_iter()
            .filter_map(|item| {
                let url = item.link.filter(|l| !l.trim().is_empty())?;
                Some(SearchResult {
                    title: item.title.unwrap_or_else(|| url.clone()),
                    snippet: item.snippet.unwrap_or_default(),
                    url,
                })
            })
            .take(num_results as usize)
            .collect();

        let knowledge_graph = payload.knowledge_graph.and_then(|kg| {
            Some(KnowledgeGraph {
                title: kg.title?,
                description: kg.description.unwrap_or_default(),
            })
        });

        debug!(
            results = results.len(),
            knowledge_graph = knowledge_graph.is_some(),
            "Parsed SerpAPI response"
        );

        Ok((results, knowledge_graph))
    }
}

#[async_trait]
impl LlmTool for SerpApiTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let query = args.get("query").and_then(|v| v.as_str()).ok_or_else(|| {
            ConnoisseurError::InvalidArgument("query parameter is required".to_string())
        })?;

        if query.trim().is_empty() {
            return Err(ConnoisseurError::InvalidArgument(
                "query parameter cannot be empty".to_string(),
            ));
        }

        let num_results = args
            .get("num_results")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS);

        let (results, knowledge_graph) = self
            .perform_search(query, num_results)
            .await
            .map_err(|e| ConnoisseurError::ToolError(format!("Search failed: {}", e)))?;

        let mut output = json!({
            "query": query,
            "search_results": results,
        });
        if let Some(kg) = knowledge_graph {
            output["knowledge_graph"] = json!(kg);
        }

        Ok(output)
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: "search_google".to_string(),
                description: "Search Google using SerpAPI. Returns organic results with title, URL and snippet, plus the knowledge graph summary when Google shows one.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query"
                        },
                        "num_results": {
                            "type": "integer",
                            "description": "Number of results to return (default 10)"
                        }
                    },
                    "required": ["query"]
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn sample_response() -> String {
        r#"{
            "search_metadata": {"status": "Success"},
            "knowledge_graph": {
                "title": "Water Lilies",
                "description": "Series of approximately 250 oil paintings by Claude Monet."
            },
            "organic_results": [
                {"position": 1, "title": "Water Lilies - MoMA", "link": "https://www.moma.org/collection/works/80220", "snippet": "Claude Monet's Water Lilies triptych."},
                {"position": 2, "title": "Impressionism - The Met", "link": "https://www.metmuseum.org/toah/hd/imml/hd_imml.htm", "snippet": "Heilbrunn Timeline essay."},
                {"position": 3, "title": "No link here"}
            ]
        }"#
        .to_string()
    }

    fn args(query: &str) -> HashMap<String, Value> {
        let mut args = HashMap::new();
        args.insert("query".to_string(), json!(query));
        args
    }

    #[test]
    fn test_descriptor() {
        let tool = SerpApiTool::with_base_url("key", "https://serpapi.com").unwrap();
        let descriptor = tool.descriptor();

        assert_eq!(descriptor.r#type, "function");
        assert_eq!(descriptor.function.name, "search_google");
        assert_eq!(descriptor.function.parameters["required"], json!(["query"]));
    }

    #[test]
    fn test_parse_results() {
        let (results, kg) = SerpApiTool::parse_results(&sample_response(), 10).unwrap();

        // The entry without a link is dropped
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Water Lilies - MoMA");
        assert_eq!(results[0].url, "https://www.moma.org/collection/works/80220");
        assert_eq!(results[1].snippet, "Heilbrunn Timeline essay.");
        assert_eq!(kg.unwrap().title, "Water Lilies");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let (results, _) = SerpApiTool::parse_results(&sample_response(), 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_parse_results_api_error() {
        let body = r#"{"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}"#;
        let err = SerpApiTool::parse_results(body, 10).unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_parse_results_empty() {
        let (results, kg) = SerpApiTool::parse_results("{}", 10).unwrap();
        assert!(results.is_empty());
        assert!(kg.is_none());
    }

    #[tokio::test]
    async fn test_run_missing_query() {
        let tool = SerpApiTool::with_base_url("key", "https://serpapi.com").unwrap();
        let result = tool.run(&HashMap::new()).await;

        assert!(matches!(result, Err(ConnoisseurError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_run_empty_query() {
        let tool = SerpApiTool::with_base_url("key", "https://serpapi.com").unwrap();
        let result = tool.run(&args("   ")).await;

        assert!(matches!(result, Err(ConnoisseurError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_run_against_server() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("engine".into(), "google".into()),
                Matcher::UrlEncoded("q".into(), "Monet water lilies".into()),
                Matcher::UrlEncoded("num".into(), "10".into()),
                Matcher::UrlEncoded("api_key".into(), "serp-key".into()),
            ]))
            .with_status(200)
            .with_body(sample_response())
            .create_async()
            .await;

        let tool = SerpApiTool::with_base_url("serp-key", server.url()).unwrap();
        let output = tool.run(&args("Monet water lilies")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(output["query"], "Monet water lilies");
        assert_eq!(output["search_results"].as_array().unwrap().len(), 2);
        assert_eq!(output["knowledge_graph"]["title"], "Water Lilies");
    }

    #[tokio::test]
    async fn test_run_http_failure_becomes_tool_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let tool = SerpApiTool::with_base_url("bad-key", server.url()).unwrap();
        let result = tool.run(&args("Cubism")).await;

        mock.assert_async().await;
        match result {
            Err(ConnoisseurError::ToolError(msg)) => assert!(msg.contains("401")),
            other => panic!("Expected ToolError, got {:?}", other.map(|_| ())),
        }
    }
}
