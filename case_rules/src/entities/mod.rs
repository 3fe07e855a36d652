//! Entity definitions for the cast of a case.

mod cast;
mod character;

pub use cast::*;
pub use character::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for every character in a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new random character ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a character ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The part a character plays in the crime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Killer,
    Victim,
    Suspect,
}

impl Role {
    /// Parse a role label coming out of generation, ignoring case and padding.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "killer" => Some(Role::Killer),
            "victim" => Some(Role::Victim),
            "suspect" => Some(Role::Suspect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Killer => "killer",
            Role::Victim => "victim",
            Role::Suspect => "suspect",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_label() {
        assert_eq!(Role::from_label("killer"), Some(Role::Killer));
        assert_eq!(Role::from_label("  Victim "), Some(Role::Victim));
        assert_eq!(Role::from_label("SUSPECT"), Some(Role::Suspect));
        assert_eq!(Role::from_label("Office Manager"), None);
        assert_eq!(Role::from_label(""), None);
    }

    #[test]
    fn test_character_id_display() {
        let uuid = Uuid::new_v4();
        let id = CharacterId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
