//! Answer pipelines.
//!
//! A pipeline turns a validated question into a formatted answer. The
//! built-in implementation is configured by a [`PipelineProfile`] rather than
//! by subclassing: the general and organization pipelines are the same code
//! with different researcher/writer personas.

use crate::outcome::PipelineChoice;
use scimentor_core::{AppError, AppResult};
use scimentor_llm::{LlmClient, LlmRequest};
use scimentor_prompt::{builtin_prompt, load_prompt, render_prompt, PromptDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Prompt ID of the research step.
pub const RESEARCH_PROMPT_ID: &str = "pipeline.research";

/// Prompt ID of the answer step.
pub const ANSWER_PROMPT_ID: &str = "pipeline.answer";

const RESEARCH_MAX_TOKENS: u32 = 1024;
const ANSWER_MAX_TOKENS: u32 = 1536;

/// Produces a formatted answer for a question in the requested language.
#[async_trait::async_trait]
pub trait Pipeline: Send + Sync {
    /// Pipeline name for logs.
    fn name(&self) -> &str;

    /// Answer `question` in `language`. Errors are returned to the caller as-is.
    async fn run(&self, question: &str, language: &str) -> AppResult<String>;
}

/// Persona for one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<String>,
}

impl AgentProfile {
    pub fn new(role: &str, goal: &str, backstory: &str, tools: &[&str]) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn variables(&self) -> HashMap<String, String> {
        let tools = if self.tools.is_empty() {
            "none".to_string()
        } else {
            self.tools.join(", ")
        };

        HashMap::from([
            ("role".to_string(), self.role.clone()),
            ("goal".to_string(), self.goal.clone()),
            ("backstory".to_string(), self.backstory.clone()),
            ("tools".to_string(), tools),
        ])
    }
}

/// Researcher and writer personas for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineProfile {
    pub name: String,
    pub researcher: AgentProfile,
    pub writer: AgentProfile,
}

impl PipelineProfile {
    /// General science and STEM education questions.
    pub fn general() -> Self {
        Self {
            name: "general".to_string(),
            researcher: AgentProfile::new(
                "Data Researcher and Retriever in SciMentor SEAMEO QIS",
                "Research and retrieve data about the given topics related to science education and STEM teaching",
                "You have searched for information on science education, STEM methodologies and \
                 scientific concepts for more than 15 years. You previously worked as a researcher in \
                 science education and curriculum development, so you find reliable scientific and \
                 pedagogical sources quickly.",
                &["web_search"],
            ),
            writer: Self::instructor(),
        }
    }

    /// Questions about the organization itself.
    pub fn organization() -> Self {
        Self {
            name: "organization".to_string(),
            researcher: AgentProfile::new(
                "Research Agent - SEAQIS",
                "Research and provide comprehensive information about SEAMEO QIS topics",
                "You are a specialised researcher in SEAMEO QIS topics: quality improvement in \
                 science education, science teaching methodologies, assessment, evaluation and \
                 curriculum development. You give accurate, detailed information about SEAMEO QIS \
                 programs, activities and initiatives.",
                &["web_search"],
            ),
            writer: Self::instructor(),
        }
    }

    /// Built-in profile for a pipeline choice.
    pub fn for_choice(choice: PipelineChoice) -> Self {
        match choice {
            PipelineChoice::General => Self::general(),
            PipelineChoice::Organization => Self::organization(),
        }
    }

    fn instructor() -> AgentProfile {
        AgentProfile::new(
            "Science Education Instructor",
            "Provide answers and educational materials for science education and STEM teaching questions",
            "You are an experienced science educator and writer who makes complex scientific \
             concepts easy to understand for students and teachers, in a way that makes learning \
             science enjoyable and accessible.",
            &[],
        )
    }
}

/// Prompt templates used by [`ProfilePipeline`].
#[derive(Debug, Clone)]
pub struct PipelinePrompts {
    pub research: PromptDefinition,
    pub answer: PromptDefinition,
}

impl PipelinePrompts {
    /// Built-in templates.
    pub fn builtin() -> AppResult<Self> {
        Ok(Self {
            research: builtin_prompt(RESEARCH_PROMPT_ID)?,
            answer: builtin_prompt(ANSWER_PROMPT_ID)?,
        })
    }

    /// Templates from the workspace, falling back to the built-ins.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Ok(Self {
            research: load_prompt(workspace, RESEARCH_PROMPT_ID)?,
            answer: load_prompt(workspace, ANSWER_PROMPT_ID)?,
        })
    }
}

/// Two sequential completions: research, then answer composition.
pub struct ProfilePipeline {
    profile: PipelineProfile,
    client: Arc<dyn LlmClient>,
    model: String,
    prompts: PipelinePrompts,
}

impl ProfilePipeline {
    pub fn new(
        profile: PipelineProfile,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompts: PipelinePrompts,
    ) -> Self {
        Self {
            profile,
            client,
            model: model.into(),
            prompts,
        }
    }

    pub fn profile(&self) -> &PipelineProfile {
        &self.profile
    }

    async fn research(&self, question: &str) -> AppResult<String> {
        let mut variables = self.profile.researcher.variables();
        variables.insert("question".to_string(), question.to_string());

        let prompt = render_prompt(&self.prompts.research, &variables)?;
        let request = LlmRequest::new(prompt, &self.model).with_max_tokens(RESEARCH_MAX_TOKENS);

        let response = self.client.complete(&request).await?;
        tracing::debug!(
            pipeline = %self.profile.name,
            chars = response.content.len(),
            "Research step finished"
        );
        Ok(response.content)
    }

    async fn compose(&self, question: &str, research: &str, language: &str) -> AppResult<String> {
        let mut variables = self.profile.writer.variables();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("research".to_string(), research.trim().to_string());
        variables.insert("language".to_string(), language.to_string());

        let prompt = render_prompt(&self.prompts.answer, &variables)?;
        let request = LlmRequest::new(prompt, &self.model).with_max_tokens(ANSWER_MAX_TOKENS);

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}

#[async_trait::async_trait]
impl Pipeline for ProfilePipeline {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn run(&self, question: &str, language: &str) -> AppResult<String> {
        tracing::info!(pipeline = %self.profile.name, %language, "Running answer pipeline");

        let research = self.research(question).await?;
        let answer = self.compose(question, &research, language).await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AppError::Pipeline(format!(
                "Pipeline '{}' produced an empty answer",
                self.profile.name
            )));
        }

        Ok(answer.to_string())
    }
}

/// Build the pipeline for a choice from its built-in profile.
pub fn build_pipeline(
    choice: PipelineChoice,
    client: Arc<dyn LlmClient>,
    model: &str,
    prompts: PipelinePrompts,
) -> Arc<dyn Pipeline> {
    Arc::new(ProfilePipeline::new(
        PipelineProfile::for_choice(choice),
        client,
        model,
        prompts,
    ))
}
