//! Tool-calling execution loop
//!
//! One run alternates between a completion request and dispatching whatever
//! tools the model asked for, until the model answers in plain text or the
//! iteration cap is hit.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use marketeer_config::Config;
use marketeer_provider::{ChatParams, Message, Provider};

use crate::conversation::Conversation;
use crate::tools::ToolRegistry;
use crate::{AgentError, Result};

/// Completion requests allowed per run
pub const MAX_ITERATIONS: u32 = 5;

pub const ITERATION_LIMIT_MESSAGE: &str =
    "Error: Agent could not complete the goal within the iteration limit.";

/// A role-specific agent that turns a goal into a final text
#[async_trait]
pub trait Executor: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, goal: &str) -> Result<String>;

    /// Like `run`, also returning the conversation when the executor keeps one
    async fn run_traced(&self, goal: &str) -> Result<(String, Option<Conversation>)> {
        Ok((self.run(goal).await?, None))
    }
}

/// Everything an executor owns: directive, toolkit and iteration cap
#[derive(Debug)]
pub struct ExecutorConfig {
    pub name: String,
    pub directive: String,
    pub tools: ToolRegistry,
    pub max_iterations: u32,
}

impl ExecutorConfig {
    pub fn new(name: impl Into<String>, directive: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            directive: directive.into(),
            tools,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

/// Per-request model knobs
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Empty means the provider's default model
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let params = ChatParams::default();
        Self {
            model: params.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

impl From<&Config> for ModelSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.provider.model.clone(),
            max_tokens: config.provider.max_tokens,
            temperature: config.provider.temperature,
        }
    }
}

/// States a run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Drafting,
    AwaitingModel,
    DispatchingTools,
    Done,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(String),
    Exhausted,
}

/// Result of one run, with the conversation that produced it
#[derive(Debug, Clone)]
pub struct LoopRun {
    pub outcome: Outcome,
    pub conversation: Conversation,
    pub completions: u32,
}

impl LoopRun {
    pub fn final_state(&self) -> LoopState {
        match self.outcome {
            Outcome::Done(_) => LoopState::Done,
            Outcome::Exhausted => LoopState::Exhausted,
        }
    }

    pub fn text(&self) -> &str {
        match &self.outcome {
            Outcome::Done(text) => text,
            Outcome::Exhausted => ITERATION_LIMIT_MESSAGE,
        }
    }

    pub fn into_text(self) -> String {
        match self.outcome {
            Outcome::Done(text) => text,
            Outcome::Exhausted => ITERATION_LIMIT_MESSAGE.to_string(),
        }
    }
}

/// The agentic loop shared by all specialists
pub struct ToolLoop {
    config: ExecutorConfig,
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
}

impl ToolLoop {
    pub fn new(config: ExecutorConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            provider,
            settings: ModelSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn directive(&self) -> &str {
        &self.config.directive
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.config.tools
    }

    pub fn max_iterations(&self) -> u32 {
        self.config.max_iterations
    }

    fn enter(&self, state: LoopState) {
        debug!("{}: -> {:?}", self.config.name, state);
    }

    /// Drive one run to completion.
    ///
    /// Provider failures abort with `Err`. Everything tool-related stays in-band.
    pub async fn execute(&self, goal: &str) -> Result<LoopRun> {
        let name = &self.config.name;
        info!("{} starting with goal: '{}'", name, goal);

        self.enter(LoopState::Drafting);
        let mut conversation = Conversation::new(&self.config.directive, goal);
        let tools = self.config.tools.definitions();
        let model = if self.settings.model.is_empty() {
            self.provider.default_model()
        } else {
            self.settings.model.clone()
        };
        let mut completions = 0;

        while completions < self.config.max_iterations {
            self.enter(LoopState::AwaitingModel);
            info!(
                "{} is thinking ({}/{})",
                name,
                completions + 1,
                self.config.max_iterations
            );

            let params = ChatParams {
                model: model.clone(),
                messages: conversation.to_vec(),
                tools: tools.clone(),
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            };
            let response = self.provider.chat(params).await?;
            completions += 1;
            debug!(
                "{} used {} tokens ({} prompt, {} completion)",
                name,
                response.usage.total_tokens,
                response.usage.prompt_tokens,
                response.usage.completion_tokens
            );

            let reply = response.to_assistant_message();
            if !reply.has_tool_calls() {
                self.enter(LoopState::Done);
                info!("{} finished generating the final response", name);
                let text = reply.content.clone().unwrap_or_default();
                conversation.push_assistant(reply)?;
                return Ok(LoopRun {
                    outcome: Outcome::Done(text),
                    conversation,
                    completions,
                });
            }

            self.enter(LoopState::DispatchingTools);
            info!(
                "{} decided to use {} tool(s)",
                name,
                reply.requested_calls().len()
            );
            conversation.push_assistant(reply.clone())?;
            self.dispatch(&mut conversation, &reply).await?;
        }

        self.enter(LoopState::Exhausted);
        warn!(
            "{} gave up after {} completion requests",
            name, completions
        );
        Ok(LoopRun {
            outcome: Outcome::Exhausted,
            conversation,
            completions,
        })
    }

    /// Run each requested call in order and record its result
    async fn dispatch(&self, conversation: &mut Conversation, reply: &Message) -> Result<()> {
        for call in reply.requested_calls() {
            let tool_name = &call.function.name;
            if let Err(e) = conversation.accepts_tool_result(&call.id) {
                warn!("{} skipped {}: {}", self.config.name, tool_name, e);
                continue;
            }
            debug!(
                "{} calling {} with args: {}",
                self.config.name, tool_name, call.function.arguments
            );

            let output = match self
                .config
                .tools
                .execute(tool_name, call.function.arguments.clone())
                .await
            {
                Ok(output) => output,
                Err(AgentError::ToolNotFound(_)) => {
                    warn!(
                        "{} tried to call an unknown tool: {}",
                        self.config.name, tool_name
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            debug!("{} got response from {}: {}", self.config.name, tool_name, output);

            conversation.push_tool_result(&call.id, tool_name, output)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Executor for ToolLoop {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn run(&self, goal: &str) -> Result<String> {
        Ok(self.execute(goal).await?.into_text())
    }

    async fn run_traced(&self, goal: &str) -> Result<(String, Option<Conversation>)> {
        let run = self.execute(goal).await?;
        let text = run.text().to_string();
        Ok((text, Some(run.conversation)))
    }
}
