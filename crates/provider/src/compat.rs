//! OpenAI-compatible chat-completion provider
//!
//! Defaults to Qwen through the DashScope compatible-mode endpoint.

use crate::*;
use reqwest::Client;
use serde_json::json;

pub const DEFAULT_API_BASE: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "qwen-max";

/// Provider for any `/chat/completions` endpoint speaking the OpenAI dialect
pub struct CompatProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
}

impl CompatProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let api_base = api_base
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let default_model = default_model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            default_model,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| {
                let mut obj = json!({ "role": m.role.as_str() });
                // Assistant turns that only carry tool calls still need an explicit null
                obj["content"] = match &m.content {
                    Some(content) => json!(content),
                    None => serde_json::Value::Null,
                };
                if let Some(tool_calls) = &m.tool_calls {
                    let calls: Vec<serde_json::Value> = tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": &tc.id,
                                "type": &tc.call_type,
                                "function": {
                                    "name": &tc.function.name,
                                    "arguments": tc.function.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    obj["tool_calls"] = json!(calls);
                }
                if let Some(tool_call_id) = &m.tool_call_id {
                    obj["tool_call_id"] = json!(tool_call_id);
                }
                if let Some(name) = &m.name {
                    obj["name"] = json!(name);
                }
                obj
            })
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        // The model always picks freely between answering and calling tools
        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];
        let content = message["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for (index, call) in calls.iter().enumerate() {
                let function = &call["function"];
                // Arguments arrive as a JSON-encoded string; keep the raw value when it doesn't parse
                let args = function["arguments"]
                    .as_str()
                    .map(|s| serde_json::from_str(s).unwrap_or_else(|_| json!(s)))
                    .unwrap_or_else(|| function["arguments"].clone());

                // Results are linked back by id, so every call needs a distinct one
                let id = match call["id"].as_str() {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => format!("call_{}", index),
                };

                tool_calls.push(ToolCall {
                    id,
                    name: function["name"].as_str().unwrap_or("").to_string(),
                    arguments: args,
                });
            }
        }

        let usage = match json["usage"].as_object() {
            Some(usage) => Usage {
                prompt_tokens: usage
                    .get("prompt_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                completion_tokens: usage
                    .get("completion_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                total_tokens: usage
                    .get("total_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
            },
            None => Usage::default(),
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for CompatProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if !self.is_configured() {
            return Err(ProviderError::NoApiKey);
        }

        trace!("requesting completion from {}", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(&params);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let error = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ProviderError::Api(error));
        }

        let json: serde_json::Value = serde_json::from_str(&text)?;

        debug!(
            "completion returned {} tool call(s)",
            json["choices"][0]["message"]["tool_calls"]
                .as_array()
                .map(|v| v.len())
                .unwrap_or(0)
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_uses_dashscope_defaults() {
        let provider = CompatProvider::new("sk-test", None, None);
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.default_model(), "qwen-max");
        assert!(provider.is_configured());
    }

    #[test]
    fn test_new_with_custom_base_trims_slash() {
        let provider = CompatProvider::new(
            "sk-test",
            Some("https://api.example.com/v1/".to_string()),
            Some("qwen-plus".to_string()),
        );
        assert_eq!(provider.api_base(), "https://api.example.com/v1");
        assert_eq!(provider.default_model(), "qwen-plus");
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        let provider = CompatProvider::new("", None, None);
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_build_request_falls_back_to_default_model() {
        let provider = CompatProvider::new("sk-test", None, None);
        let params = ChatParams {
            messages: vec![Message::user("Hello")],
            ..Default::default()
        };

        let request = provider.build_request(&params);
        assert_eq!(request["model"], "qwen-max");
        assert!(request.get("tools").is_none());
        assert!(request.get("tool_choice").is_none());
    }

    #[test]
    fn test_build_request_with_tools_is_auto() {
        let provider = CompatProvider::new("sk-test", None, None);
        let params = ChatParams {
            model: "qwen-max".to_string(),
            messages: vec![Message::user("Check reviews")],
            tools: vec![Tool::new(
                "get_latest_reviews",
                "Fetch reviews",
                object_schema(vec![]),
            )],
            ..Default::default()
        };

        let request = provider.build_request(&params);
        assert_eq!(request["tool_choice"], "auto");
        assert_eq!(request["tools"][0]["type"], "function");
        assert_eq!(request["tools"][0]["function"]["name"], "get_latest_reviews");
    }

    #[test]
    fn test_build_request_encodes_tool_call_arguments_as_string() {
        let provider = CompatProvider::new("sk-test", None, None);
        let assistant = Message::assistant_with_tool_calls(
            None,
            Some(vec![ToolCallDef::new(
                "call_1",
                "search_local_trends",
                json!({"query": "pumpkin spice"}),
            )]),
        );
        let params = ChatParams {
            messages: vec![
                assistant,
                Message::tool("call_1", "search_local_trends", "Trending now"),
            ],
            ..Default::default()
        };

        let request = provider.build_request(&params);
        let messages = request["messages"].as_array().unwrap();
        assert!(messages[0]["content"].is_null());
        let args = messages[0]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(args).unwrap(),
            json!({"query": "pumpkin spice"})
        );
        assert_eq!(messages[1]["role"], "tool");
        assert_eq!(messages[1]["tool_call_id"], "call_1");
        assert_eq!(messages[1]["name"], "search_local_trends");
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let provider = CompatProvider::new("sk-test", None, None);
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {
                            "name": "post_to_instagram",
                            "arguments": "{\"caption\":\"Hi\",\"image_description\":\"Mug\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        });

        let response = provider.parse_response(body).unwrap();
        assert!(response.content.is_none());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_9");
        assert_eq!(response.tool_calls[0].arguments["caption"], "Hi");
        assert_eq!(response.usage.total_tokens, 20);
        assert_eq!(response.finish_reason, "tool_calls");
    }

    #[test]
    fn test_parse_response_keeps_unparseable_arguments_raw() {
        let provider = CompatProvider::new("sk-test", None, None);
        let body = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "search_local_trends", "arguments": "not json"}
                    }]
                }
            }]
        });

        let response = provider.parse_response(body).unwrap();
        assert_eq!(response.tool_calls[0].arguments, json!("not json"));
    }

    #[test]
    fn test_parse_response_fills_missing_call_ids() {
        let provider = CompatProvider::new("sk-test", None, None);
        let body = json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"function": {"name": "get_latest_reviews", "arguments": "{}"}},
                        {"id": "", "function": {"name": "get_latest_reviews", "arguments": "{}"}},
                        {"id": "call_abc", "function": {"name": "get_latest_reviews", "arguments": "{}"}}
                    ]
                }
            }]
        });

        let response = provider.parse_response(body).unwrap();
        let ids: Vec<_> = response.tool_calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["call_0", "call_1", "call_abc"]);
    }

    #[test]
    fn test_parse_response_without_choices_is_invalid() {
        let provider = CompatProvider::new("sk-test", None, None);
        let result = provider.parse_response(json!({"choices": []}));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }
}
