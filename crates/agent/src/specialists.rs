//! Specialist executors: Spark (social media) and Echo (reputation)

use async_trait::async_trait;
use std::sync::Arc;

use marketeer_config::Config;
use marketeer_provider::Provider;

use crate::conversation::Conversation;
use crate::loop_agent::{Executor, ExecutorConfig, ModelSettings, ToolLoop};
use crate::profile::BusinessProfile;
use crate::tools::{InstagramPostTool, ReviewsTool, ToolRegistry, TrendSearchTool};
use crate::Result;

pub fn social_directive(profile: &BusinessProfile) -> String {
    format!(
        r#"You are a highly skilled, autonomous AI Social Media Manager named 'Spark'.
Your client is a local small business. Here is their profile:
---
{}
---
Your primary goal is to help this business thrive by creating engaging social media content.
You are proactive and creative. You must operate within the brand voice defined in the profile.

You have access to a set of tools to help you. When you need to use a tool,
respond ONLY with the appropriate JSON object to call the function.
Do not add any other text or explanation.

If you have enough information to generate the post directly, do that.
Your final output should be the complete, ready-to-post content."#,
        profile.text().trim()
    )
}

pub fn reputation_directive(profile: &BusinessProfile, brand_voice: &str) -> String {
    format!(
        r#"You are a professional and empathetic AI Reputation Manager named 'Echo'.
Your client is a local small business. Here is their profile:
---
{}
---
Your primary goal is to manage the business's online reputation by drafting responses to customer reviews.
You must operate within the brand voice: '{}'.

- For positive reviews (4-5 stars), be thankful and highlight something specific they mentioned.
- For negative reviews (1-3 stars), be professional, apologize for the poor experience, and offer a way to make it right (e.g., "contact us at..."). Do not be defensive.

You must first use the `get_latest_reviews` tool to fetch the reviews.
Then, provide a drafted response for each review you've analyzed."#,
        profile.text().trim(),
        brand_voice
    )
}

/// Content creation: trend search plus Instagram posting
pub struct SocialMediaAgent {
    inner: ToolLoop,
}

impl SocialMediaAgent {
    pub const PERSONA: &'static str = "Spark";

    pub fn new(profile: &BusinessProfile, provider: Arc<dyn Provider>, config: &Config) -> Self {
        let tools = ToolRegistry::new()
            .with(TrendSearchTool::from_config(config))
            .with(InstagramPostTool::new());
        Self::with_tools(profile, provider, tools).with_settings(ModelSettings::from(config))
    }

    /// Build with an explicit toolkit
    pub fn with_tools(
        profile: &BusinessProfile,
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
    ) -> Self {
        let config = ExecutorConfig::new(Self::PERSONA, social_directive(profile), tools);
        Self {
            inner: ToolLoop::new(config, provider),
        }
    }

    pub fn with_settings(self, settings: ModelSettings) -> Self {
        Self {
            inner: self.inner.with_settings(settings),
        }
    }

    pub fn tool_loop(&self) -> &ToolLoop {
        &self.inner
    }
}

/// Reputation management: drafts replies to the latest reviews
pub struct ReputationAgent {
    inner: ToolLoop,
}

impl ReputationAgent {
    pub const PERSONA: &'static str = "Echo";

    /// Fails when the profile carries no `brand_voice:` line
    pub fn new(
        profile: &BusinessProfile,
        provider: Arc<dyn Provider>,
        config: &Config,
    ) -> Result<Self> {
        let tools = ToolRegistry::new().with(ReviewsTool::new());
        Ok(Self::with_tools(profile, provider, tools)?.with_settings(ModelSettings::from(config)))
    }

    pub fn with_tools(
        profile: &BusinessProfile,
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
    ) -> Result<Self> {
        let brand_voice = profile.require_brand_voice()?;
        let config = ExecutorConfig::new(
            Self::PERSONA,
            reputation_directive(profile, brand_voice),
            tools,
        );
        Ok(Self {
            inner: ToolLoop::new(config, provider),
        })
    }

    pub fn with_settings(self, settings: ModelSettings) -> Self {
        Self {
            inner: self.inner.with_settings(settings),
        }
    }

    pub fn tool_loop(&self) -> &ToolLoop {
        &self.inner
    }
}

#[async_trait]
impl Executor for SocialMediaAgent {
    fn name(&self) -> &str {
        Self::PERSONA
    }

    async fn run(&self, goal: &str) -> Result<String> {
        self.inner.run(goal).await
    }

    async fn run_traced(&self, goal: &str) -> Result<(String, Option<Conversation>)> {
        self.inner.run_traced(goal).await
    }
}

#[async_trait]
impl Executor for ReputationAgent {
    fn name(&self) -> &str {
        Self::PERSONA
    }

    async fn run(&self, goal: &str) -> Result<String> {
        self.inner.run(goal).await
    }

    async fn run_traced(&self, goal: &str) -> Result<(String, Option<Conversation>)> {
        self.inner.run_traced(goal).await
    }
}
