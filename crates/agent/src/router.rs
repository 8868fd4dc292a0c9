//! Goal router
//!
//! Picks a specialist by keyword membership. Rules are checked in order and
//! the first match wins, so a goal mentioning both "post" and "review" always
//! goes to the social media specialist.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use marketeer_config::Config;
use marketeer_provider::Provider;

use crate::conversation::Conversation;
use crate::loop_agent::Executor;
use crate::profile::BusinessProfile;
use crate::specialists::{ReputationAgent, SocialMediaAgent};
use crate::{AgentError, Result};

pub const ROUTING_FAILURE_MESSAGE: &str = "Error: I'm not sure which specialist should handle this goal. Please be more specific. Try using words like 'post' for social media or 'review' for reputation management.";

const SOCIAL_KEYWORDS: &[&str] = &[
    "post",
    "instagram",
    "social media",
    "tweet",
    "facebook",
    "content",
    "create",
];

const REPUTATION_KEYWORDS: &[&str] = &[
    "review",
    "reputation",
    "feedback",
    "comment",
    "rating",
    "respond",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialist {
    SocialMedia,
    Reputation,
}

impl Specialist {
    pub fn persona(&self) -> &'static str {
        match self {
            Specialist::SocialMedia => SocialMediaAgent::PERSONA,
            Specialist::Reputation => ReputationAgent::PERSONA,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Specialist::SocialMedia => "Social Media",
            Specialist::Reputation => "Reputation",
        }
    }
}

/// A specialist and the keywords that select it
#[derive(Debug, Clone)]
pub struct RoutingRule {
    pub specialist: Specialist,
    keywords: Vec<String>,
}

impl RoutingRule {
    pub fn new<I, S>(specialist: Specialist, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            specialist,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// `goal` must already be lowercased
    pub fn matches(&self, goal: &str) -> bool {
        self.keywords.iter().any(|k| goal.contains(k.as_str()))
    }
}

/// Built-in rules in priority order
pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(Specialist::SocialMedia, SOCIAL_KEYWORDS),
        RoutingRule::new(Specialist::Reputation, REPUTATION_KEYWORDS),
    ]
}

pub fn classify_with(rules: &[RoutingRule], goal: &str) -> Option<Specialist> {
    let goal = goal.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&goal))
        .map(|rule| rule.specialist)
}

/// Classify with the built-in rules
pub fn classify(goal: &str) -> Option<Specialist> {
    classify_with(&default_rules(), goal)
}

/// What happened to a delegated goal
#[derive(Debug)]
pub struct Delegation {
    pub specialist: Option<Specialist>,
    pub result: String,
    pub conversation: Option<Conversation>,
}

/// Single entry point: takes a goal, hands it to the right specialist
pub struct ManagerAgent {
    rules: Vec<RoutingRule>,
    executors: HashMap<Specialist, Box<dyn Executor>>,
    /// Specialists that could not be built, with the reason
    unavailable: HashMap<Specialist, String>,
}

impl ManagerAgent {
    /// Build Spark and Echo around a shared provider.
    ///
    /// Echo needs a `brand_voice:` line. Without one it is left out and
    /// reputation goals fail with `AgentError::Profile` when routed.
    pub fn new(profile: &BusinessProfile, provider: Arc<dyn Provider>, config: &Config) -> Self {
        info!("initializing specialist agents");
        let mut executors: HashMap<Specialist, Box<dyn Executor>> = HashMap::new();
        executors.insert(
            Specialist::SocialMedia,
            Box::new(SocialMediaAgent::new(profile, provider.clone(), config)),
        );

        let mut manager = Self::with_executors(default_rules(), executors);
        match ReputationAgent::new(profile, provider, config) {
            Ok(echo) => {
                manager
                    .executors
                    .insert(Specialist::Reputation, Box::new(echo));
            }
            Err(e) => {
                warn!("{} is unavailable: {}", ReputationAgent::PERSONA, e);
                let reason = match e {
                    AgentError::Profile(reason) => reason,
                    other => other.to_string(),
                };
                manager.unavailable.insert(Specialist::Reputation, reason);
            }
        }
        info!("specialists are ready");

        manager
    }

    pub fn with_executors(
        rules: Vec<RoutingRule>,
        executors: HashMap<Specialist, Box<dyn Executor>>,
    ) -> Self {
        Self {
            rules,
            executors,
            unavailable: HashMap::new(),
        }
    }

    pub fn is_available(&self, specialist: Specialist) -> bool {
        self.executors.contains_key(&specialist)
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn route(&self, goal: &str) -> Option<Specialist> {
        classify_with(&self.rules, goal)
    }

    pub fn executor(&self, specialist: Specialist) -> Option<&dyn Executor> {
        self.executors.get(&specialist).map(|e| e.as_ref())
    }

    /// Route and run `goal`, returning the specialist's final text.
    ///
    /// An unroutable goal is not an error; it yields `ROUTING_FAILURE_MESSAGE`.
    pub async fn delegate(&self, goal: &str) -> Result<String> {
        Ok(self.dispatch(goal, false).await?.result)
    }

    /// `delegate`, keeping the specialist's conversation
    pub async fn delegate_traced(&self, goal: &str) -> Result<Delegation> {
        self.dispatch(goal, true).await
    }

    async fn dispatch(&self, goal: &str, traced: bool) -> Result<Delegation> {
        info!("received goal -> '{}', analyzing", goal);

        let specialist = self.route(goal);
        if let Some(reason) = specialist.and_then(|s| self.unavailable.get(&s)) {
            return Err(AgentError::Profile(reason.clone()));
        }

        let routed =
            specialist.and_then(|s| self.executor(s).map(|executor| (s, executor)));

        let Some((specialist, executor)) = routed else {
            info!("goal is unclear, could not delegate to a specialist");
            return Ok(Delegation {
                specialist: None,
                result: ROUTING_FAILURE_MESSAGE.to_string(),
                conversation: None,
            });
        };

        info!(
            "goal identified for {}, delegating to '{}'",
            specialist.label(),
            executor.name()
        );

        let (result, conversation) = if traced {
            executor.run_traced(goal).await?
        } else {
            (executor.run(goal).await?, None)
        };

        if result.starts_with("Error:") {
            warn!("'{}' returned an error result", executor.name());
        }

        Ok(Delegation {
            specialist: Some(specialist),
            result,
            conversation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_scenarios() {
        assert_eq!(
            classify("Create an engaging Instagram post about our weekly special"),
            Some(Specialist::SocialMedia)
        );
        assert_eq!(
            classify("Check for new customer reviews"),
            Some(Specialist::Reputation)
        );
        assert_eq!(classify("Do something generic"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("TWEET about the launch"), Some(Specialist::SocialMedia));
        assert_eq!(classify("Our RATING dropped"), Some(Specialist::Reputation));
    }

    #[test]
    fn test_first_rule_wins_on_overlap() {
        assert_eq!(
            classify("Create a reply to each review"),
            Some(Specialist::SocialMedia)
        );
    }

    #[test]
    fn test_substring_matching() {
        // "reposting" contains "post"
        assert_eq!(classify("stop reposting memes"), Some(Specialist::SocialMedia));
        assert_eq!(classify("Respond politely"), Some(Specialist::Reputation));
    }

    #[test]
    fn test_custom_rule_order() {
        let rules = vec![
            RoutingRule::new(Specialist::Reputation, ["Review"]),
            RoutingRule::new(Specialist::SocialMedia, ["post"]),
        ];
        assert_eq!(rules[0].keywords(), &["review".to_string()]);
        assert_eq!(
            classify_with(&rules, "post a review"),
            Some(Specialist::Reputation)
        );
    }

    #[test]
    fn test_specialist_personas() {
        assert_eq!(Specialist::SocialMedia.persona(), "Spark");
        assert_eq!(Specialist::Reputation.persona(), "Echo");
    }
}
