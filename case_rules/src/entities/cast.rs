//! The validated cast of a case.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Character, CharacterId, Role};
use crate::error::RulesError;

/// The full cast of one case, in presentation order.
///
/// A cast always holds exactly one killer and exactly one victim. Their positions are
/// captured on construction so accusations never have to scan roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Character>", into = "Vec<Character>")]
pub struct Cast {
    characters: Vec<Character>,
    killer: usize,
    victim: usize,
}

impl Cast {
    /// Validate a list of characters as a cast.
    pub fn new(characters: Vec<Character>) -> Result<Self, RulesError> {
        let killer = single_with_role(&characters, Role::Killer)?;
        let victim = single_with_role(&characters, Role::Victim)?;

        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for character in &characters {
            let name = character.name.trim();
            if name.is_empty() {
                return Err(RulesError::invalid_case("character with an empty name"));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(RulesError::invalid_case(format!(
                    "duplicate character name '{}'",
                    name
                )));
            }
            if !ids.insert(character.id) {
                return Err(RulesError::invalid_case(format!(
                    "duplicate character id {}",
                    character.id
                )));
            }
        }

        Ok(Self {
            characters,
            killer,
            victim,
        })
    }

    /// Number of characters, victim included.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Get character by ID.
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Find a character by name, ignoring case and surrounding whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&Character> {
        let name = name.trim().to_lowercase();
        self.characters
            .iter()
            .find(|c| c.name.trim().to_lowercase() == name)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.get(id).is_some()
    }

    /// All characters in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// Everyone who can be interviewed or accused (the whole cast minus the victim).
    pub fn suspects(&self) -> impl Iterator<Item = &Character> {
        let victim = self.victim().id;
        self.characters.iter().filter(move |c| c.id != victim)
    }

    pub fn victim(&self) -> &Character {
        &self.characters[self.victim]
    }

    /// Whether `id` names the killer. Constant time against the captured killer.
    pub fn is_killer(&self, id: CharacterId) -> bool {
        self.characters[self.killer].id == id
    }

    pub(crate) fn killer(&self) -> &Character {
        &self.characters[self.killer]
    }
}

impl TryFrom<Vec<Character>> for Cast {
    type Error = RulesError;

    fn try_from(characters: Vec<Character>) -> Result<Self, Self::Error> {
        Self::new(characters)
    }
}

impl From<Cast> for Vec<Character> {
    fn from(cast: Cast) -> Self {
        cast.characters
    }
}

fn single_with_role(characters: &[Character], role: Role) -> Result<usize, RulesError> {
    let mut matching = characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.role == role)
        .map(|(index, _)| index);
    match (matching.next(), matching.next()) {
        (Some(index), None) => Ok(index),
        (None, _) => Err(RulesError::invalid_case(format!("no character is the {}", role))),
        (Some(_), Some(_)) => Err(RulesError::invalid_case(format!(
            "more than one character is the {}",
            role
        ))),
    }
}
