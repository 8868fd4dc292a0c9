//! get_latest_reviews: fixed sample of customer reviews

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::ToolTrait;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

impl Review {
    fn new(author: &str, rating: u8, comment: &str) -> Self {
        Self {
            author: author.to_string(),
            rating,
            comment: comment.to_string(),
        }
    }
}

/// Stand-in for a review platform API
#[derive(Debug, Clone)]
pub struct ReviewsTool {
    reviews: Vec<Review>,
}

impl ReviewsTool {
    pub fn new() -> Self {
        Self::with_reviews(sample_reviews())
    }

    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }
}

impl Default for ReviewsTool {
    fn default() -> Self {
        Self::new()
    }
}

pub fn sample_reviews() -> Vec<Review> {
    vec![
        Review::new(
            "Alice",
            5,
            "The 'Volcano' Dark Roast is absolutely life-changing! The atmosphere is so cozy and the staff are incredibly friendly. My new favorite spot!",
        ),
        Review::new(
            "Bob",
            4,
            "Great coffee and fast Wi-Fi. It can get a little crowded during peak hours, but it's a solid place to work from.",
        ),
        Review::new(
            "Charlie",
            2,
            "The pastries were a bit stale and my latte was lukewarm. Was really hoping for more. Disappointed.",
        ),
    ]
}

#[async_trait]
impl ToolTrait for ReviewsTool {
    fn name(&self) -> &str {
        "get_latest_reviews"
    }

    fn description(&self) -> &str {
        "Fetches the most recent customer reviews for the business from online platforms."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(
        &self,
        _args: serde_json::Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        info!("fetching {} latest customer reviews", self.reviews.len());
        Ok(serde_json::to_string(&self.reviews)?)
    }
}
