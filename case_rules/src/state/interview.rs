//! The per-character interview protocol.

use serde::{Deserialize, Serialize};

use crate::entities::CharacterId;
use crate::error::RulesError;
use crate::transcript::Transcript;

/// Where an interview with one character stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    #[default]
    NotStarted,
    Introduced,
    AwaitingQuestion,
    AwaitingAnswer,
    Ended,
}

/// Things that happen during an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewEvent {
    /// The character introduced itself.
    Introduce,
    /// The interview is open for the next question.
    Ready,
    /// A question was put to the character.
    Ask,
    /// The character answered.
    Answer,
    /// The detective assistant declared the interview exhausted.
    Conclude,
}

impl InterviewState {
    /// Apply one event, returning the next state.
    pub fn apply(self, event: InterviewEvent) -> Result<InterviewState, RulesError> {
        use InterviewEvent as E;
        use InterviewState as S;

        match (self, event) {
            (S::NotStarted, E::Introduce) => Ok(S::Introduced),
            (S::Introduced, E::Ready) => Ok(S::AwaitingQuestion),
            (S::AwaitingQuestion, E::Ask) => Ok(S::AwaitingAnswer),
            (S::AwaitingAnswer, E::Answer) => Ok(S::AwaitingQuestion),
            (S::AwaitingQuestion, E::Conclude) => Ok(S::Ended),
            (state, event) => Err(RulesError::transition(
                format!("{:?}", event).to_lowercase(),
                format!("the interview is {}", state),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewState::NotStarted => "not started",
            InterviewState::Introduced => "introduced",
            InterviewState::AwaitingQuestion => "awaiting a question",
            InterviewState::AwaitingAnswer => "awaiting an answer",
            InterviewState::Ended => "ended",
        }
    }
}

impl std::fmt::Display for InterviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The interview record kept for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub character: CharacterId,
    pub state: InterviewState,
    pub transcript: Transcript,
}
