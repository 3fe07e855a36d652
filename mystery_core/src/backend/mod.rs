//! Generation backend port - the only way the game talks to a language model.
//!
//! Two capabilities are consumed:
//! - **generate_text**: free text conditioned on a system context and a transcript
//! - **generate_structured**: a JSON object conforming to a given schema
//!
//! Anything malformed, empty or schema-violating is a [`GenerationError`]; callers never
//! parse model output ad hoc.

mod bounded;
mod openai;

pub use bounded::*;
pub use openai::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Why a request is made. Used for logging and to route mock responses in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    CastCreation,
    StoryCreation,
    Narration,
    Introduction,
    Answer,
    AssistantQuestion,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::CastCreation => "cast_creation",
            Purpose::StoryCreation => "story_creation",
            Purpose::Narration => "narration",
            Purpose::Introduction => "introduction",
            Purpose::Answer => "answer",
            Purpose::AssistantQuestion => "assistant_question",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the generation backend. All of them are recoverable: the command that
/// triggered the request fails and may be retried by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("output does not match schema '{schema}': {message}")]
    SchemaViolation { schema: String, message: String },

    #[error("empty {0} output")]
    Empty(Purpose),
}

impl GenerationError {
    /// Create a SchemaViolation error.
    pub fn schema(schema: impl Into<String>, message: impl ToString) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            message: message.to_string(),
        }
    }
}

/// Role of a message sender, from the point of view of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request for free text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub purpose: Purpose,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
}

impl TextRequest {
    pub fn new(purpose: Purpose, system_prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }
}

/// JSON schema the structured output must follow.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Request for a schema-conforming JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub purpose: Purpose,
    pub system_prompt: String,
    pub instruction: String,
    pub schema: OutputSchema,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError>;

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// Generate free text and reject blank output.
pub async fn request_text(
    backend: &dyn GenerationBackend,
    request: TextRequest,
) -> Result<String, GenerationError> {
    let purpose = request.purpose;
    tracing::debug!(
        purpose = %purpose,
        messages = request.messages.len(),
        system_len = request.system_prompt.len(),
        "Requesting text generation"
    );

    let text = backend.generate_text(request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Empty(purpose));
    }
    Ok(text.to_string())
}

/// Generate a structured object and deserialize it into `T`.
pub async fn request_as<T: DeserializeOwned>(
    backend: &dyn GenerationBackend,
    request: StructuredRequest,
) -> Result<T, GenerationError> {
    let schema = request.schema.name.clone();
    tracing::debug!(
        purpose = %request.purpose,
        schema = %schema,
        "Requesting structured generation"
    );

    let value = backend.generate_structured(request).await?;
    serde_json::from_value(value).map_err(|e| GenerationError::schema(schema, e))
}
