//! Marketing agents
//!
//! Goal routing plus the tool-calling loop shared by the specialist executors.

use thiserror::Error;

use marketeer_provider::ProviderError;

pub mod conversation;
pub mod loop_agent;
pub mod profile;
pub mod router;
pub mod specialists;
pub mod tools;

pub use conversation::Conversation;
pub use loop_agent::{
    Executor, ExecutorConfig, LoopRun, LoopState, ModelSettings, Outcome, ToolLoop,
    ITERATION_LIMIT_MESSAGE, MAX_ITERATIONS,
};
pub use profile::BusinessProfile;
pub use router::{
    classify, Delegation, ManagerAgent, RoutingRule, Specialist, ROUTING_FAILURE_MESSAGE,
};
pub use specialists::{ReputationAgent, SocialMediaAgent};
pub use tools::{ToolRegistry, ToolTrait};

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("completion service error: {0}")]
    Provider(#[from] ProviderError),

    #[error("business profile error: {0}")]
    Profile(String),

    #[error("conversation invariant violated: {0}")]
    Conversation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
