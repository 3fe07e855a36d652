//! The crime scenario: what everyone can see, and the solution nobody may see until the
//! game is over.

use serde::{Deserialize, Serialize};

use crate::entities::Cast;
use crate::error::RulesError;

/// Crime facts visible to the player and to every character from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeFacts {
    pub victim_name: String,
    pub time_of_death: String,
    pub location_found: String,
    pub murder_weapon: String,
    pub cause_of_death: String,
    pub crime_scene_details: String,
    pub witnesses: String,
    pub initial_clues: String,
    /// Brief on the cast and their relationships. Never names the killer.
    pub npc_brief: String,
}

/// Reveal-only explanation of the crime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub killer_motive: String,
    pub murder_method_details: String,
    pub key_evidence: String,
    pub red_herrings_explanation: String,
    pub complete_timeline: String,
}

/// One generated crime. Immutable once created.
///
/// The solution is stored apart from the visible facts and is only handed out by
/// [`crate::GameState`] once the game has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub environment: String,
    pub facts: CrimeFacts,
    solution: Solution,
}

impl Scenario {
    /// Assemble a scenario, rejecting blank fields and a victim the cast does not know.
    pub fn new(
        environment: impl Into<String>,
        facts: CrimeFacts,
        solution: Solution,
        cast: &Cast,
    ) -> Result<Self, RulesError> {
        let environment = environment.into();
        require("environment", &environment)?;
        for (name, value) in facts.fields() {
            require(name, value)?;
        }
        for (name, value) in solution.fields() {
            require(name, value)?;
        }

        if !cast.victim().name.trim().eq_ignore_ascii_case(facts.victim_name.trim()) {
            return Err(RulesError::invalid_case(format!(
                "scenario victim '{}' is not the cast's victim '{}'",
                facts.victim_name,
                cast.victim().name
            )));
        }

        Ok(Self {
            environment,
            facts,
            solution,
        })
    }

    pub(crate) fn solution(&self) -> &Solution {
        &self.solution
    }
}

impl CrimeFacts {
    fn fields(&self) -> [(&'static str, &str); 9] {
        [
            ("victim_name", self.victim_name.as_str()),
            ("time_of_death", self.time_of_death.as_str()),
            ("location_found", self.location_found.as_str()),
            ("murder_weapon", self.murder_weapon.as_str()),
            ("cause_of_death", self.cause_of_death.as_str()),
            ("crime_scene_details", self.crime_scene_details.as_str()),
            ("witnesses", self.witnesses.as_str()),
            ("initial_clues", self.initial_clues.as_str()),
            ("npc_brief", self.npc_brief.as_str()),
        ]
    }
}

impl Solution {
    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("killer_motive", self.killer_motive.as_str()),
            ("murder_method_details", self.murder_method_details.as_str()),
            ("key_evidence", self.key_evidence.as_str()),
            ("red_herrings_explanation", self.red_herrings_explanation.as_str()),
            ("complete_timeline", self.complete_timeline.as_str()),
        ]
    }
}

fn require(name: &str, value: &str) -> Result<(), RulesError> {
    if value.trim().is_empty() {
        return Err(RulesError::invalid_case(format!("{} is empty", name)));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_valid_scenario() {
        let cast = cast();
        let scenario = scenario(&cast);
        assert_eq!(scenario.facts.victim_name, "Margot");
        assert_eq!(scenario.solution().key_evidence, "The torn badge is Lucie's");
    }

    #[test]
    fn test_blank_field_rejected() {
        let cast = cast();
        let mut facts = facts();
        facts.murder_weapon = "  ".to_string();
        let result = Scenario::new("Office", facts, solution(), &cast);
        assert!(matches!(result, Err(RulesError::InvalidCase(_))));

        let mut reveal = solution();
        reveal.complete_timeline.clear();
        assert!(Scenario::new("Office", super::fixtures::facts(), reveal, &cast).is_err());
    }

    #[test]
    fn test_victim_must_match_cast() {
        let cast = cast();

        let mut facts = facts();
        facts.victim_name = "Nobody".to_string();
        assert!(Scenario::new("Office", facts, solution(), &cast).is_err());

        let mut facts = super::fixtures::facts();
        facts.victim_name = "Henri".to_string();
        assert!(Scenario::new("Office", facts, solution(), &cast).is_err());

        let mut facts = super::fixtures::facts();
        facts.victim_name = " margot ".to_string();
        assert!(Scenario::new("Office", facts, solution(), &cast).is_ok());
    }
}
