//! Conversation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The scene narrator. Only ever appears in the scene log.
    Narrator,
    /// The character being interviewed.
    Character,
    /// A question typed by the player.
    Player,
    /// A question formulated by the detective assistant.
    Assistant,
}

impl Speaker {
    /// Whether this speaker asks the questions in an interview.
    pub fn is_interviewer(&self) -> bool {
        match self {
            Speaker::Player | Speaker::Assistant => true,
            Speaker::Narrator | Speaker::Character => false,
        }
    }
}

/// A single line in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp,
        }
    }

    /// Create a turn stamped with the current time.
    pub fn now(speaker: Speaker, text: impl Into<String>) -> Self {
        Self::new(speaker, text, Utc::now())
    }
}

/// An ordered, append-only list of turns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of questions asked so far, by the player or the assistant.
    pub fn questions_asked(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker.is_interviewer())
            .count()
    }
}

impl FromIterator<Turn> for Transcript {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
