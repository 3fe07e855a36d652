//! Detective Assistant - asks the next question on the player's behalf.

use case_rules::{Character, CrimeFacts, Transcript};
use serde::Deserialize;

use crate::backend::{request_as, GenerationBackend, GenerationError};
use crate::prompt_assembler::PromptAssembler;

/// Legacy plain-text termination marker.
pub const EXIT_MARKER: &str = "EXIT";

/// What the assistant decided to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantMove {
    /// Put this question to the character.
    Ask(String),
    /// The character has nothing more of value to say.
    Conclude,
}

/// Raw structured reply, validated by [`AssistantReply::into_move`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub end_interview: bool,
}

impl AssistantReply {
    /// Exactly one of a question or the end signal must be present.
    pub fn into_move(self) -> Result<AssistantMove, GenerationError> {
        let question = self
            .question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        match (question, self.end_interview) {
            (Some(q), _) if q == EXIT_MARKER => Ok(AssistantMove::Conclude),
            (Some(q), false) => Ok(AssistantMove::Ask(q)),
            (None, true) => Ok(AssistantMove::Conclude),
            (Some(_), true) => Err(GenerationError::schema(
                "assistant_move",
                "both a question and end_interview were given",
            )),
            (None, false) => Err(GenerationError::schema(
                "assistant_move",
                "neither a question nor end_interview was given",
            )),
        }
    }
}

/// Stateless question policy. Every call sees one character's full transcript.
pub struct DetectiveAssistant<'a> {
    backend: &'a dyn GenerationBackend,
    prompts: &'a PromptAssembler,
}

impl<'a> DetectiveAssistant<'a> {
    pub fn new(backend: &'a dyn GenerationBackend, prompts: &'a PromptAssembler) -> Self {
        Self { backend, prompts }
    }

    pub async fn next_move(
        &self,
        character: &Character,
        facts: &CrimeFacts,
        transcript: &Transcript,
    ) -> Result<AssistantMove, GenerationError> {
        let request = self
            .prompts
            .assistant_question(character, facts, transcript);
        let reply: AssistantReply = request_as(self.backend, request).await?;
        let next = reply.into_move()?;
        tracing::debug!(
            character = %character.name,
            conclude = matches!(next, AssistantMove::Conclude),
            "Assistant decided"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockGenerationBackend, Purpose};
    use serde_json::json;

    fn reply(question: Option<&str>, end_interview: bool) -> AssistantReply {
        AssistantReply {
            question: question.map(str::to_string),
            end_interview,
        }
    }

    #[test]
    fn test_reply_validation() {
        assert_eq!(
            reply(Some(" Where were you? "), false).into_move().unwrap(),
            AssistantMove::Ask("Where were you?".to_string())
        );
        assert_eq!(reply(None, true).into_move().unwrap(), AssistantMove::Conclude);
        assert_eq!(reply(Some("  "), true).into_move().unwrap(), AssistantMove::Conclude);

        assert!(reply(Some("Why?"), true).into_move().is_err());
        assert!(reply(None, false).into_move().is_err());
        assert!(reply(Some("   "), false).into_move().is_err());
    }

    #[test]
    fn test_exit_marker_only_as_whole_text() {
        assert_eq!(
            reply(Some(" EXIT \n"), false).into_move().unwrap(),
            AssistantMove::Conclude
        );
        assert_eq!(
            reply(Some("Did you EXIT the building?"), false)
                .into_move()
                .unwrap(),
            AssistantMove::Ask("Did you EXIT the building?".to_string())
        );
    }

    #[tokio::test]
    async fn test_next_move_from_backend() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate_structured()
            .withf(|request| request.purpose == Purpose::AssistantQuestion)
            .times(1)
            .returning(|_| Ok(json!({"question": null, "end_interview": true})));
        let prompts = PromptAssembler::default();
        let paul = Character::new("Paul").with_occupation("Sales lead");
        let facts = CrimeFacts {
            victim_name: "Margot".to_string(),
            time_of_death: "23:00".to_string(),
            location_found: "The server room".to_string(),
            murder_weapon: "A cable".to_string(),
            cause_of_death: "Strangulation".to_string(),
            crime_scene_details: "Racks hum.".to_string(),
            witnesses: "The night guard".to_string(),
            initial_clues: "A torn badge".to_string(),
            npc_brief: "Paul argued with Margot.".to_string(),
        };

        let next = DetectiveAssistant::new(&backend, &prompts)
            .next_move(&paul, &facts, &Transcript::new())
            .await
            .unwrap();
        assert_eq!(next, AssistantMove::Conclude);
    }
}
