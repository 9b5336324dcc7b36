//! The three-stage report pipeline: look, research, write.
//!
//! Every stage depends on the previous one's output, so they run strictly in order.
//! Any failure from a hosted service aborts the run and is returned unchanged; nothing
//! is retried and no partial report is kept.

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::gateways::{OpenAIConfig, OpenAIGateway};
use crate::llm::tools::SerpApiTool;
use crate::llm::{LlmBroker, LlmGateway, LlmTool};
use crate::report::input::ApiKeys;
use crate::report::profile::ArtworkProfile;
use crate::report::prompts;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Free-text observations from the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualInsights(pub String);

/// Markdown link list produced by the research step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchLinks(pub String);

/// The final markdown brief, exactly as the report model returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(String);

impl Report {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self(markdown.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Models and endpoints the pipeline talks to.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub vision_model: String,
    pub research_model: String,
    pub report_model: String,
    pub openai_base_url: String,
    pub serpapi_base_url: String,
    pub http_timeout: Duration,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            vision_model: config.vision_model.clone(),
            research_model: config.research_model.clone(),
            report_model: config.report_model.clone(),
            openai_base_url: config.openai_base_url.clone(),
            serpapi_base_url: config.serpapi_base_url.clone(),
            http_timeout: config.http_timeout,
        }
    }
}

/// Anything that can turn a validated profile into a report.
///
/// The web layer only sees this trait, so it can be driven by a stub in tests.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, profile: &ArtworkProfile, keys: &ApiKeys) -> Result<Report>;
}

/// Production pipeline: OpenAI for all three stages, SerpAPI for research.
pub struct ReportPipeline {
    settings: PipelineSettings,
}

impl ReportPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Run all three stages with the given gateway and search tool.
    pub async fn run(
        settings: &PipelineSettings,
        gateway: Arc<dyn LlmGateway>,
        search_tool: Box<dyn LlmTool>,
        profile: &ArtworkProfile,
    ) -> Result<(VisualInsights, ResearchLinks, Report)> {
        let correlation_id = Uuid::new_v4().to_string();
        info!(correlation_id = %correlation_id, "Starting artwork report generation");

        let insights = analyze_artwork(settings, gateway.clone(), profile, &correlation_id).await?;
        info!(correlation_id = %correlation_id, chars = insights.0.len(), "Visual analysis complete");

        let links =
            research_artwork(settings, gateway.clone(), search_tool, &insights, profile, &correlation_id)
                .await?;
        info!(correlation_id = %correlation_id, chars = links.0.len(), "Research complete");

        let report = write_report(settings, gateway, &insights, &links, profile, &correlation_id).await?;
        info!(correlation_id = %correlation_id, chars = report.as_str().len(), "Report ready");

        Ok((insights, links, report))
    }
}

#[async_trait]
impl ReportGenerator for ReportPipeline {
    async fn generate(&self, profile: &ArtworkProfile, keys: &ApiKeys) -> Result<Report> {
        let gateway = OpenAIGateway::with_config(OpenAIConfig {
            base_url: self.settings.openai_base_url.clone(),
            timeout: Some(self.settings.http_timeout),
            ..OpenAIConfig::new(keys.model.clone())
        })?;
        let search_tool = SerpApiTool::with_base_url(keys.search.clone(), &self.settings.serpapi_base_url)?;

        let (_, _, report) =
            Self::run(&self.settings, Arc::new(gateway), Box::new(search_tool), profile).await?;
        Ok(report)
    }
}

/// Stage 1: describe the artwork from the image alone.
async fn analyze_artwork(
    settings: &PipelineSettings,
    gateway: Arc<dyn LlmGateway>,
    profile: &ArtworkProfile,
    correlation_id: &str,
) -> Result<VisualInsights> {
    let agent = Agent::new(prompts::ANALYZER_NAME, LlmBroker::new(&settings.vision_model, gateway))
        .with_role(prompts::ANALYZER_ROLE)
        .with_description(prompts::ANALYZER_DESCRIPTION)
        .with_instructions(prompts::ANALYZER_INSTRUCTIONS.iter().copied())
        .with_markdown(true);

    // The gateway reads images from disk; the copy is removed when `image_file` drops.
    let mut image_file = tempfile::Builder::new()
        .prefix("artwork-")
        .suffix(&format!(".{}", profile.image.format.extension()))
        .tempfile()?;
    image_file.write_all(&profile.image.bytes)?;
    image_file.flush()?;
    let image_path = image_file.path().to_string_lossy().to_string();

    let text = agent.run(prompts::ANALYZER_PROMPT, vec![image_path], Some(correlation_id)).await?;
    Ok(VisualInsights(text))
}

/// Stage 2: search the web for references matching the analysis and metadata.
async fn research_artwork(
    settings: &PipelineSettings,
    gateway: Arc<dyn LlmGateway>,
    search_tool: Box<dyn LlmTool>,
    insights: &VisualInsights,
    profile: &ArtworkProfile,
    correlation_id: &str,
) -> Result<ResearchLinks> {
    let broker = LlmBroker::new(&settings.research_model, gateway)
        .with_tool_call_limit(prompts::RESEARCH_TOOL_CALL_LIMIT);
    let agent = Agent::new(prompts::RESEARCHER_NAME, broker)
        .with_role(prompts::RESEARCHER_ROLE)
        .with_description(prompts::RESEARCHER_DESCRIPTION)
        .with_instructions(prompts::RESEARCHER_INSTRUCTIONS.iter().copied())
        .with_tool(search_tool)
        .with_markdown(true);

    let prompt = prompts::research_prompt(&insights.0, profile);
    let text = agent.run(&prompt, vec![], Some(correlation_id)).await?;
    Ok(ResearchLinks(text))
}

/// Stage 3: write the final brief from the analysis and the links.
async fn write_report(
    settings: &PipelineSettings,
    gateway: Arc<dyn LlmGateway>,
    insights: &VisualInsights,
    links: &ResearchLinks,
    profile: &ArtworkProfile,
    correlation_id: &str,
) -> Result<Report> {
    let agent = Agent::new(prompts::REPORTER_NAME, LlmBroker::new(&settings.report_model, gateway))
        .with_role(prompts::REPORTER_ROLE)
        .with_description(prompts::REPORTER_DESCRIPTION)
        .with_instructions(prompts::REPORTER_INSTRUCTIONS.iter().copied())
        .with_markdown(true)
        .with_datetime_in_instructions(true);

    let prompt = prompts::report_prompt(&insights.0, &links.0, profile);
    let text = agent.run(&prompt, vec![], Some(correlation_id)).await?;
    Ok(Report::new(text))
}
