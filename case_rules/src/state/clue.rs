//! The case notebook: clues the player pinned during the investigation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::CharacterId;

/// Unique identifier for clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClueId(pub Uuid);

impl ClueId {
    /// Create a new random clue ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a clue was picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueSource {
    CrimeScene,
    Interview(CharacterId),
}

/// A note the player pinned to the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: ClueId,
    pub text: String,
    pub source: ClueSource,
    pub discovered_at: DateTime<Utc>,
}
