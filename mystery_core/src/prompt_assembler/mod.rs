//! Prompt Assembler - Builds every request sent to the generation backend.
//!
//! Requests are assembled from game state in a fixed way:
//! 1. **Persona**: the character being played, if any
//! 2. **Facts**: the visible crime facts only
//! 3. **History**: the interview transcript, replayed as chat messages
//! 4. **Instruction**: the task for this request
//!
//! Reveal-only fields of the case never appear in an assembled request.

mod schemas;
mod templates;

pub use schemas::*;

use case_rules::{Character, CrimeFacts, Speaker, Transcript};
use serde::{Deserialize, Serialize};

use crate::backend::{ChatMessage, Purpose, StructuredRequest, TextRequest};

/// Names used by the prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// The detective the player and the assistant speak as.
    pub detective: String,

    /// Who narrates the crime scene.
    pub narrator: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            detective: "Sherlock Holmes".to_string(),
            narrator: "Dr. John Watson".to_string(),
        }
    }
}

/// Builds backend requests from game state.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn cast_creation(&self, environment: &str, cast_size: u32) -> StructuredRequest {
        StructuredRequest {
            purpose: Purpose::CastCreation,
            system_prompt: templates::cast_creation(environment, cast_size),
            instruction: "Generate the set of characters.".to_string(),
            schema: cast_schema(),
        }
    }

    pub fn story_creation(&self, environment: &str, characters: &[Character]) -> StructuredRequest {
        StructuredRequest {
            purpose: Purpose::StoryCreation,
            system_prompt: templates::story_creation(environment, characters),
            instruction: "Generate the murder story.".to_string(),
            schema: story_schema(),
        }
    }

    pub fn narration(&self, facts: &CrimeFacts) -> TextRequest {
        TextRequest::new(
            Purpose::Narration,
            templates::narration(&self.config.detective, &self.config.narrator, facts),
        )
        .with_message(ChatMessage::user("Describe the crime scene."))
    }

    pub fn introduction(&self, character: &Character, facts: &CrimeFacts) -> TextRequest {
        TextRequest::new(
            Purpose::Introduction,
            templates::introduction(&self.config.detective, character, facts),
        )
        .with_message(ChatMessage::user("Introduce yourself."))
    }

    /// The character's answer to `question`, given everything said so far. The question
    /// is sent once, as the last user message.
    pub fn answer(
        &self,
        character: &Character,
        facts: &CrimeFacts,
        transcript: &Transcript,
        question: &str,
    ) -> TextRequest {
        TextRequest::new(
            Purpose::Answer,
            templates::answer(&self.config.detective, character, facts),
        )
        .with_messages(transcript_messages(transcript))
        .with_message(ChatMessage::user(question))
    }

    /// The detective assistant's next move in an interview.
    pub fn assistant_question(
        &self,
        character: &Character,
        facts: &CrimeFacts,
        transcript: &Transcript,
    ) -> StructuredRequest {
        let history = self.render_history(character, transcript);
        StructuredRequest {
            purpose: Purpose::AssistantQuestion,
            system_prompt: templates::assistant_question(
                &self.config.detective,
                character,
                facts,
                &history,
            ),
            instruction: format!("What do you ask {} next?", character.name),
            schema: assistant_schema(),
        }
    }

    /// Render a transcript as labelled lines.
    pub fn render_history(&self, character: &Character, transcript: &Transcript) -> String {
        transcript
            .turns()
            .iter()
            .map(|turn| {
                let label = match turn.speaker {
                    Speaker::Narrator => self.config.narrator.as_str(),
                    Speaker::Character => character.name.as_str(),
                    Speaker::Player | Speaker::Assistant => self.config.detective.as_str(),
                };
                format!("{}: {}", label, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Replay a transcript from the character's point of view: the character speaks as the
/// model, everyone else as the user.
pub fn transcript_messages(transcript: &Transcript) -> Vec<ChatMessage> {
    transcript
        .turns()
        .iter()
        .map(|turn| match turn.speaker {
            Speaker::Character => ChatMessage::assistant(turn.text.clone()),
            Speaker::Player | Speaker::Assistant | Speaker::Narrator => {
                ChatMessage::user(turn.text.clone())
            }
        })
        .collect()
}
