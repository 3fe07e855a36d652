//! Character Dialogue Engine - produces what an interviewed character says.
//!
//! The engine never touches game state. It only turns a character, the visible facts and
//! a transcript into the next character turn; committing turns is up to the session.

mod assistant;

pub use assistant::*;

use case_rules::{Character, CrimeFacts, Speaker, Transcript, Turn};

use crate::backend::{request_text, GenerationBackend, GenerationError};
use crate::prompt_assembler::PromptAssembler;

/// Speaks for characters during interviews.
pub struct DialogueEngine<'a> {
    backend: &'a dyn GenerationBackend,
    prompts: &'a PromptAssembler,
}

impl<'a> DialogueEngine<'a> {
    pub fn new(backend: &'a dyn GenerationBackend, prompts: &'a PromptAssembler) -> Self {
        Self { backend, prompts }
    }

    /// The character's first words when the detective walks in.
    pub async fn introduce(
        &self,
        character: &Character,
        facts: &CrimeFacts,
    ) -> Result<Turn, GenerationError> {
        let request = self.prompts.introduction(character, facts);
        let text = request_text(self.backend, request).await?;
        tracing::debug!(character = %character.name, "Character introduced");
        Ok(Turn::now(Speaker::Character, text))
    }

    /// The character's answer to `question`.
    ///
    /// `transcript` is the character's own transcript without the question, which has
    /// not been committed yet.
    pub async fn answer(
        &self,
        character: &Character,
        facts: &CrimeFacts,
        transcript: &Transcript,
        question: &str,
    ) -> Result<Turn, GenerationError> {
        let request = self.prompts.answer(character, facts, transcript, question);
        let text = request_text(self.backend, request).await?;
        Ok(Turn::now(Speaker::Character, text))
    }
}
