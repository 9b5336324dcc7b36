//! LLM-backed agent with a persona.
//!
//! An [`Agent`] pairs an [`LlmBroker`] with the text that shapes the model's behaviour:
//! a description, a role, a list of instructions, and optional tools. Each call to
//! [`Agent::run`] is a fresh two-message conversation (system + user).

use crate::error::Result;
use crate::llm::{LlmBroker, LlmMessage, LlmTool};
use chrono::{DateTime, Local};
use tracing::info;

/// An LLM agent defined by its persona and instructions.
///
/// # Examples
///
/// ```ignore
/// use art_connoisseur::agent::Agent;
///
/// let agent = Agent::new("Art Style Analyzer", broker)
///     .with_role("Analyzes a piece of artwork")
///     .with_instructions(["Remain grounded in visual evidence."])
///     .with_markdown(true);
///
/// let insights = agent.run("Analyze the artwork", vec![image_path], None).await?;
/// ```
pub struct Agent {
    name: String,
    role: Option<String>,
    description: Option<String>,
    instructions: Vec<String>,
    broker: LlmBroker,
    tools: Vec<Box<dyn LlmTool>>,
    markdown: bool,
    add_datetime_to_instructions: bool,
}

impl Agent {
    pub fn new(name: impl Into<String>, broker: LlmBroker) -> Self {
        Self {
            name: name.into(),
            role: None,
            description: None,
            instructions: Vec::new(),
            broker,
            tools: Vec::new(),
            markdown: false,
            add_datetime_to_instructions: false,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tool(mut self, tool: Box<dyn LlmTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn with_datetime_in_instructions(mut self, enabled: bool) -> Self {
        self.add_datetime_to_instructions = enabled;
        self
    }

    /// Build the system prompt using the current local time.
    pub fn system_prompt(&self) -> String {
        self.system_prompt_at(Local::now())
    }

    /// Build the system prompt as it would read at `now`.
    pub fn system_prompt_at(&self, now: DateTime<Local>) -> String {
        let mut prompt = String::new();

        if let Some(description) = &self.description {
            prompt.push_str(description.trim());
            prompt.push('\n');
        }

        if let Some(role) = &self.role {
            prompt.push_str(&format!("\n<your_role>\n{}\n</your_role>\n", role));
        }

        if !self.instructions.is_empty() {
            prompt.push_str("\n<instructions>\n");
            for instruction in &self.instructions {
                if instruction.is_empty() {
                    prompt.push('\n');
                } else {
                    prompt.push_str(&format!("- {}\n", instruction));
                }
            }
            prompt.push_str("</instructions>\n");
        }

        let mut additional = Vec::new();
        if self.markdown {
            additional.push("Use markdown to format your answers.".to_string());
        }
        if self.add_datetime_to_instructions {
            additional.push(format!("The current time is {}", now.format("%Y-%m-%d %H:%M:%S")));
        }
        if !additional.is_empty() {
            prompt.push_str("\n<additional_information>\n");
            for line in additional {
                prompt.push_str(&format!("- {}\n", line));
            }
            prompt.push_str("</additional_information>\n");
        }

        prompt
    }

    /// Run the agent on a single prompt, optionally with images attached.
    pub async fn run(
        &self,
        prompt: &str,
        image_paths: Vec<String>,
        correlation_id: Option<&str>,
    ) -> Result<String> {
        info!(
            agent = %self.name,
            model = self.broker.model(),
            images = image_paths.len(),
            tools = self.tools.len(),
            "Running agent"
        );

        let mut user = LlmMessage::user(prompt);
        if !image_paths.is_empty() {
            user = user.with_images(image_paths);
        }

        let messages = vec![LlmMessage::system(self.system_prompt()), user];
        let tools = (!self.tools.is_empty()).then_some(self.tools.as_slice());

        self.broker
            .generate(&messages, tools, correlation_id)
            .await
    }
}
