//! Character definitions.

use serde::{Deserialize, Serialize};

use super::{CharacterId, Role};

/// A member of the cast. Immutable once the case has been generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
    /// Position in the setting, e.g. "head chef". Every character has one, the killer
    /// included, so it says nothing about the role.
    pub occupation: String,
    pub backstory: String,
}

impl Character {
    /// Create a new suspect with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            role: Role::Suspect,
            occupation: String::new(),
            backstory: String::new(),
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the occupation.
    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = occupation.into();
        self
    }

    /// Set the backstory.
    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn is_killer(&self) -> bool {
        self.role == Role::Killer
    }

    pub fn is_victim(&self) -> bool {
        self.role == Role::Victim
    }

    /// The persona block used when the character speaks for itself.
    pub fn persona(&self) -> String {
        format!(
            "Name: {}\nRole: {}\nOccupation: {}\nBackstory: {}\n",
            self.name, self.role, self.occupation, self.backstory
        )
    }
}
