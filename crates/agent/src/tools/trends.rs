//! search_local_trends: web search through the Tavily API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use marketeer_provider::object_schema;

use super::ToolTrait;

const DEFAULT_API_BASE: &str = "https://api.tavily.com";

/// Looks up local trends, news or events for content inspiration
pub struct TrendSearchTool {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    search_depth: String,
}

impl TrendSearchTool {
    /// Falls back to `TAVILY_API_KEY` when no key is given
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var(marketeer_config::SEARCH_KEY_ENV).ok())
            .unwrap_or_default();
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            search_depth: "basic".to_string(),
        }
    }

    pub fn from_config(config: &marketeer_config::Config) -> Self {
        Self::new(config.search_api_key())
            .with_api_base(config.toolkit.search.api_base.clone())
            .with_search_depth(config.toolkit.search.search_depth.clone())
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        if !api_base.is_empty() {
            self.api_base = api_base.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }

    async fn search(&self, query: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/search", self.api_base);
        let data: serde_json::Value = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": &self.api_key,
                "query": query,
                "search_depth": &self.search_depth,
                "include_answer": true,
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Prefer the condensed answer, fall back to the raw result list
        Ok(match data.get("answer").and_then(|a| a.as_str()) {
            Some(answer) if !answer.is_empty() => answer.to_string(),
            _ => data
                .get("results")
                .cloned()
                .unwrap_or(serde_json::Value::Array(Vec::new()))
                .to_string(),
        })
    }
}

#[derive(Deserialize)]
struct TrendArgs {
    query: String,
}

#[async_trait]
impl ToolTrait for TrendSearchTool {
    fn name(&self) -> &str {
        "search_local_trends"
    }

    fn description(&self) -> &str {
        "Searches the web for local trends, news, or events to get inspiration for marketing content."
    }

    fn parameters(&self) -> serde_json::Value {
        object_schema(vec![(
            "query".to_string(),
            "The specific search query, e.g., 'coffee shop promotions for students'.".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: serde_json::Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: TrendArgs = serde_json::from_value(args)?;
        if self.api_key.is_empty() {
            return Ok("Error: TAVILY_API_KEY is not set.".to_string());
        }
        debug!("trend search: {}", args.query);

        match self.search(&args.query).await {
            Ok(summary) => Ok(summary),
            Err(e) => Ok(format!(
                "Error performing search for query '{}': {}",
                args.query, e
            )),
        }
    }
}
