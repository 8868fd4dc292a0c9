//! post_to_instagram: simulated Instagram publishing

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::info;

use marketeer_provider::object_schema;

use super::ToolTrait;

pub const POST_CONFIRMATION: &str =
    "Success: The post was successfully sent to the mock Instagram API.";

/// A post accepted by the mock API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub caption: String,
    pub image_description: String,
}

/// Mock Instagram client. Posts are logged and kept in memory.
#[derive(Default)]
pub struct InstagramPostTool {
    published: Mutex<Vec<PublishedPost>>,
}

impl InstagramPostTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts accepted so far, oldest first
    pub fn published(&self) -> Vec<PublishedPost> {
        self.published
            .lock()
            .map(|posts| posts.clone())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct PostArgs {
    caption: String,
    image_description: String,
}

#[async_trait]
impl ToolTrait for InstagramPostTool {
    fn name(&self) -> &str {
        "post_to_instagram"
    }

    fn description(&self) -> &str {
        "Creates a new post on the business's Instagram account."
    }

    fn parameters(&self) -> serde_json::Value {
        object_schema(vec![
            (
                "caption".to_string(),
                "The full text of the post's caption, including hashtags.".to_string(),
                true,
            ),
            (
                "image_description".to_string(),
                "A detailed, descriptive prompt for an AI image generator to create the post's visual."
                    .to_string(),
                true,
            ),
        ])
    }

    async fn execute(
        &self,
        args: serde_json::Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: PostArgs = serde_json::from_value(args)?;

        info!("mock instagram post | image: {}", args.image_description);
        info!("mock instagram post | caption: {}", args.caption);

        self.published
            .lock()
            .map_err(|_| "instagram post log is poisoned")?
            .push(PublishedPost {
                caption: args.caption,
                image_description: args.image_description,
            });

        Ok(POST_CONFIRMATION.to_string())
    }
}
