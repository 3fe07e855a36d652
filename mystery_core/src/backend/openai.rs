//! Client for any OpenAI-compatible chat completions API (OpenAI, Ollama, vLLM, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ChatMessage, GenerationBackend, GenerationError, MessageRole, StructuredRequest, TextRequest,
};

/// Default base URL (a local Ollama instance).
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Connection settings for the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Upper bound for a single request, in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.1,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Generation backend speaking the `/v1/chat/completions` protocol.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    config: BackendConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: BackendConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            config: BackendConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, GenerationError> {
        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.config.timeout())
            } else {
                GenerationError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| GenerationError::Request(e.to_string()))?;
            return Err(GenerationError::Request(format!("{}: {}", status, error_text)));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        first_content(api_response)
    }

    fn chat_request(&self, system_prompt: &str, messages: &[ChatMessage]) -> ChatRequest {
        let mut api_messages = vec![ApiMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        }];
        api_messages.extend(messages.iter().map(|m| ApiMessage {
            role: match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: m.content.clone(),
        }));

        ChatRequest {
            model: self.config.model.clone(),
            messages: api_messages,
            temperature: Some(self.config.temperature),
            max_tokens: self.config.max_tokens,
            response_format: None,
        }
    }

    fn structured_chat_request(&self, request: &StructuredRequest) -> ChatRequest {
        let mut api_request = self.chat_request(
            &request.system_prompt,
            &[ChatMessage::user(request.instruction.clone())],
        );
        api_request.response_format = Some(ResponseFormat {
            r#type: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: request.schema.name.clone(),
                schema: request.schema.schema.clone(),
                strict: true,
            },
        });
        api_request
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatibleClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        let api_request = self.chat_request(&request.system_prompt, &request.messages);
        self.complete(api_request).await
    }

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<serde_json::Value, GenerationError> {
        let api_request = self.structured_chat_request(&request);
        let content = self.complete(api_request).await?;
        parse_json_object(&content)
            .map_err(|message| GenerationError::schema(request.schema.name, message))
    }
}

fn first_content(response: ChatResponse) -> Result<String, GenerationError> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        GenerationError::InvalidResponse("no choices in completion response".to_string())
    })?;
    if choice.finish_reason.as_deref() == Some("length") {
        tracing::warn!("Completion was cut off by the token limit");
    }
    Ok(choice.message.content.unwrap_or_default())
}

/// Parse model output as a JSON object, tolerating a surrounding markdown code fence.
fn parse_json_object(content: &str) -> Result<serde_json::Value, String> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    Ok(value)
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{OutputSchema, Purpose};
    use serde_json::json;

    fn client() -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(BackendConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().config().base_url, "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_shape() {
        let request = client().chat_request(
            "You are a witness.",
            &[
                ChatMessage::assistant("Good evening."),
                ChatMessage::user("Where were you?"),
            ],
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert_eq!(json["messages"][2]["content"], "Where were you?");
        assert!(json.get("response_format").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_structured_request_carries_schema() {
        let structured = StructuredRequest {
            purpose: Purpose::CastCreation,
            system_prompt: "Design a cast".to_string(),
            instruction: "Generate the set of characters".to_string(),
            schema: OutputSchema::new("cast", json!({"type": "object"})),
        };
        let request = client().structured_chat_request(&structured);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_schema");
        assert_eq!(json["response_format"]["json_schema"]["name"], "cast");
        assert_eq!(json["messages"][1]["content"], "Generate the set of characters");
    }

    #[test]
    fn test_parse_json_object() {
        assert_eq!(
            parse_json_object(r#"{"a": 1}"#).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            parse_json_object("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert!(parse_json_object("[1, 2]").is_err());
        assert!(parse_json_object("The killer is the butler").is_err());
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "Hello"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "Hello");

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            first_content(empty),
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
