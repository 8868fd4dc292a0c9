//! Tests for the toolkit and tool registry

mod common;

use common::{FailingTool, RecordingTool};
use serde_json::json;

use marketeer_agent::tools::instagram::POST_CONFIRMATION;
use marketeer_agent::tools::reviews::sample_reviews;
use marketeer_agent::tools::{InstagramPostTool, Review, ReviewsTool, TrendSearchTool};
use marketeer_agent::{AgentError, ToolRegistry, ToolTrait};

#[test]
fn test_registry_lookup() {
    let registry = ToolRegistry::new()
        .with(ReviewsTool::new())
        .with(InstagramPostTool::new());

    assert_eq!(registry.len(), 2);
    assert!(registry.has("get_latest_reviews"));
    assert!(registry.has("post_to_instagram"));
    assert!(!registry.has("search_local_trends"));
    assert!(registry.get("post_to_instagram").is_some());
}

#[test]
fn test_registry_definitions_sorted_by_name() {
    let registry = ToolRegistry::new()
        .with(TrendSearchTool::new(Some(String::new())))
        .with(InstagramPostTool::new())
        .with(ReviewsTool::new());

    let names: Vec<_> = registry
        .definitions()
        .into_iter()
        .map(|t| t.function.name)
        .collect();
    assert_eq!(
        names,
        vec!["get_latest_reviews", "post_to_instagram", "search_local_trends"]
    );
    assert!(registry
        .definitions()
        .iter()
        .all(|t| t.tool_type == "function"));
}

#[test]
fn test_registering_twice_keeps_latest() {
    let mut registry = ToolRegistry::new();
    registry.register(RecordingTool::new("dup", "first"));
    registry.register(RecordingTool::new("dup", "second"));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_registry_unknown_tool_is_err() {
    let registry = ToolRegistry::new();
    let result = registry.execute("post_to_tiktok", json!({})).await;
    assert!(matches!(result, Err(AgentError::ToolNotFound(name)) if name == "post_to_tiktok"));
}

#[tokio::test]
async fn test_registry_reports_missing_argument_in_band() {
    let registry = ToolRegistry::new().with(InstagramPostTool::new());

    let output = registry
        .execute("post_to_instagram", json!({"caption": "Hello"}))
        .await
        .unwrap();

    assert!(output.starts_with("Error: invalid arguments for 'post_to_instagram'"));
    assert!(output.contains("image_description"));
}

#[tokio::test]
async fn test_registry_reports_tool_failure_in_band() {
    let registry = ToolRegistry::new().with(FailingTool {
        message: "boom".to_string(),
    });

    let output = registry.execute("flaky", json!({})).await.unwrap();
    assert_eq!(output, "Error: tool 'flaky' failed: boom");
}

#[tokio::test]
async fn test_reviews_tool_returns_sample_reviews() {
    let tool = ReviewsTool::new();
    let output = tool.execute(json!({})).await.unwrap();

    let reviews: Vec<Review> = serde_json::from_str(&output).unwrap();
    assert_eq!(reviews, sample_reviews());
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[0].author, "Alice");
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[2].author, "Charlie");
    assert_eq!(reviews[2].rating, 2);
}

#[tokio::test]
async fn test_reviews_tool_with_custom_reviews() {
    let tool = ReviewsTool::with_reviews(vec![Review {
        author: "Dana".to_string(),
        rating: 3,
        comment: "Okay".to_string(),
    }]);

    let output = tool.execute(json!({})).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, json!([{"author": "Dana", "rating": 3, "comment": "Okay"}]));
}

#[tokio::test]
async fn test_instagram_tool_records_post() {
    let tool = InstagramPostTool::new();
    assert_eq!(tool.name(), "post_to_instagram");

    let output = tool
        .execute(json!({
            "caption": "Volcano Roast is back! #coffee",
            "image_description": "A steaming mug on a rustic table"
        }))
        .await
        .unwrap();

    assert_eq!(output, POST_CONFIRMATION);
    let published = tool.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].caption, "Volcano Roast is back! #coffee");
    assert_eq!(
        published[0].image_description,
        "A steaming mug on a rustic table"
    );
}

#[test]
fn test_instagram_schema_requires_both_fields() {
    let params = InstagramPostTool::new().parameters();
    assert_eq!(params["type"], "object");
    assert_eq!(params["required"], json!(["caption", "image_description"]));
}

#[test]
fn test_trend_search_schema() {
    let tool = TrendSearchTool::new(Some(String::new()));
    assert_eq!(tool.name(), "search_local_trends");
    assert_eq!(tool.parameters()["required"], json!(["query"]));
}

#[tokio::test]
async fn test_trend_search_without_key() {
    let tool = TrendSearchTool::new(Some(String::new()));
    let output = tool.execute(json!({"query": "coffee"})).await.unwrap();
    assert_eq!(output, "Error: TAVILY_API_KEY is not set.");
}

#[tokio::test]
async fn test_trend_search_returns_answer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_body(mockito::Matcher::PartialJson(json!({
            "api_key": "tvly-test",
            "query": "student coffee deals",
            "include_answer": true
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"answer": "Students love loyalty cards.", "results": []}"#)
        .create_async()
        .await;

    let tool = TrendSearchTool::new(Some("tvly-test".to_string())).with_api_base(server.url());
    let output = tool
        .execute(json!({"query": "student coffee deals"}))
        .await
        .unwrap();

    assert_eq!(output, "Students love loyalty cards.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trend_search_falls_back_to_results() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [{"title": "Latte art week"}]}"#)
        .create_async()
        .await;

    let tool = TrendSearchTool::new(Some("tvly-test".to_string())).with_api_base(server.url());
    let output = tool.execute(json!({"query": "events"})).await.unwrap();

    assert!(output.contains("Latte art week"));
}

#[tokio::test]
async fn test_trend_search_http_error_is_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .with_status(500)
        .create_async()
        .await;

    let tool = TrendSearchTool::new(Some("tvly-test".to_string())).with_api_base(server.url());
    let output = tool.execute(json!({"query": "X"})).await.unwrap();

    assert!(output.starts_with("Error performing search for query 'X': "));
}
