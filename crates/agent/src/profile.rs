//! Business profile text

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::{AgentError, Result};

/// Profile written by `marketeer init`
pub const SAMPLE_PROFILE: &str = "\
business_name: Ember & Bean Coffee House
location: 14 Market Street, Portland, OR
category: Independent coffee shop and bakery
brand_voice: Warm, friendly and a little playful, never pushy
signature_items: 'Volcano' Dark Roast, house-made pastries, oat milk lattes
weekly_special: Any latte plus a pastry for $7 every Wednesday
audience: Students, remote workers and neighborhood regulars
amenities: Fast Wi-Fi, plenty of outlets, quiet corner upstairs
contact: hello@emberandbean.example
";

fn brand_voice_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"brand_voice:[ \t]*([^\r\n]*)").ok())
        .as_ref()
}

/// Free-form narrative about the business, interpolated into directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessProfile {
    text: String,
}

impl BusinessProfile {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgentError::Profile(format!(
                "business profile not found at {}",
                path.display()
            )));
        }
        debug!("loading business profile from {:?}", path);
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text after the first `brand_voice:` up to the end of that line,
    /// trimmed. The key may appear anywhere on a line, not just at its start.
    pub fn brand_voice(&self) -> Option<&str> {
        brand_voice_pattern()?
            .captures(&self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|voice| !voice.is_empty())
    }

    pub fn require_brand_voice(&self) -> Result<&str> {
        self.brand_voice().ok_or_else(|| {
            AgentError::Profile("profile has no 'brand_voice: <value>' line".to_string())
        })
    }
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self::new(SAMPLE_PROFILE)
    }
}
