//! Read-only projections handed to the presentation layer.

use serde::Serialize;

use super::{Accusation, Clue, GameState, InterviewState};
use crate::entities::CharacterId;
use crate::rules::{GameOutcome, Page, Phase};
use crate::scenario::{CrimeFacts, Solution};

/// A character as shown to the player. Roles are never exposed, only whether the
/// character is the victim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterCard {
    pub id: CharacterId,
    pub name: String,
    pub occupation: String,
    pub backstory: String,
    pub is_victim: bool,
    pub interviewed: bool,
    pub interview: InterviewState,
}

/// End-of-game statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub characters_interviewed: usize,
    pub suspects: usize,
    pub guesses_made: usize,
    pub clues_found: usize,
}

/// What is revealed once the game has ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reveal {
    pub killer: CharacterCard,
    pub solution: Solution,
}

/// Snapshot of everything the player may see right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub phase: Phase,
    pub page: Page,
    pub environment: String,
    pub facts: CrimeFacts,
    pub narration: Option<String>,
    pub characters: Vec<CharacterCard>,
    pub selected: Option<CharacterId>,
    pub guesses_left: u32,
    pub accusations: Vec<Accusation>,
    pub clues: Vec<Clue>,
    pub stats: GameStats,
    pub outcome: Option<GameOutcome>,
    /// Present only when `phase` is `Ended`.
    pub reveal: Option<Reveal>,
}

impl GameState {
    /// Project the state for display.
    pub fn view(&self) -> GameView {
        let card = |id: CharacterId| {
            self.cast.get(id).map(|c| CharacterCard {
                id: c.id,
                name: c.name.clone(),
                occupation: c.occupation.clone(),
                backstory: c.backstory.clone(),
                is_victim: c.is_victim(),
                interviewed: self.interviews.contains_key(&c.id),
                interview: self.interview_state(c.id),
            })
        };

        let reveal = match (self.revealed_killer(), self.revealed_solution()) {
            (Some(killer), Some(solution)) => card(killer.id).map(|killer| Reveal {
                killer,
                solution: solution.clone(),
            }),
            _ => None,
        };

        GameView {
            phase: self.phase,
            page: self.page,
            environment: self.scenario.environment.clone(),
            facts: self.scenario.facts.clone(),
            narration: self.scene_log.turns().first().map(|t| t.text.clone()),
            characters: self.cast.iter().filter_map(|c| card(c.id)).collect(),
            selected: self.selected,
            guesses_left: self.guesses_left,
            accusations: self.accusations.clone(),
            clues: self.clues.clone(),
            stats: GameStats {
                characters_interviewed: self.interviewed_count(),
                suspects: self.cast.suspects().count(),
                guesses_made: self.accusations.len(),
                clues_found: self.clues.len(),
            },
            outcome: self.outcome,
            reveal,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::scenario::fixtures;
    use crate::transcript::{Speaker, Turn};

    fn new_game() -> GameState {
        let cast = fixtures::cast();
        let scenario = fixtures::scenario(&cast);
        let narration = Turn::now(Speaker::Narrator, "A grim scene, Holmes.");
        GameState::new(cast, scenario, narration, 2).unwrap()
    }

    #[test]
    fn test_view_hides_solution_before_end() {
        let mut state = new_game();
        let paul = state.cast().find_by_name("Paul").unwrap().id;

        let view = state.view();
        assert!(view.reveal.is_none());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("embezzlement"));
        assert!(!json.contains("killer"));

        state.set_phase(Phase::Guessing).unwrap();
        state.accuse(paul, Utc::now()).unwrap();
        let json = serde_json::to_string(&state.view()).unwrap();
        assert!(!json.contains("embezzlement"));
    }

    #[test]
    fn test_view_reveals_after_end() {
        let mut state = new_game();
        let lucie = state.cast().find_by_name("Lucie").unwrap().id;
        state.set_phase(Phase::Guessing).unwrap();
        state.accuse(lucie, Utc::now()).unwrap();

        let view = state.view();
        let reveal = view.reveal.unwrap();
        assert_eq!(reveal.killer.name, "Lucie");
        assert_eq!(reveal.solution.key_evidence, "The torn badge is Lucie's");
        assert_eq!(view.outcome, Some(GameOutcome::Win));
    }

    #[test]
    fn test_view_interview_flags_and_stats() {
        let mut state = new_game();
        let henri = state.cast().find_by_name("Henri").unwrap().id;
        state
            .select_character(henri, Some(Turn::now(Speaker::Character, "Hello.")))
            .unwrap();

        let view = state.view();
        assert_eq!(view.characters.len(), 5);
        assert_eq!(view.narration.as_deref(), Some("A grim scene, Holmes."));
        let henri_card = view.characters.iter().find(|c| c.id == henri).unwrap();
        assert!(henri_card.interviewed);
        assert_eq!(henri_card.interview, InterviewState::AwaitingQuestion);
        assert_eq!(view.characters.iter().filter(|c| c.is_victim).count(), 1);
        assert_eq!(view.stats.characters_interviewed, 1);
        assert_eq!(view.stats.suspects, 4);
    }

    #[test]
    fn test_killer_card_looks_like_any_suspect() {
        let state = new_game();
        let lucie = state.cast().find_by_name("Lucie").unwrap().id;
        let view = state.view();

        let killer = view.characters.iter().find(|c| c.id == lucie).unwrap();
        for card in view.characters.iter().filter(|c| !c.is_victim) {
            assert!(!card.occupation.trim().is_empty(), "{} has no occupation", card.name);
            assert_eq!(card.interviewed, killer.interviewed);
            assert_eq!(card.interview, killer.interview);
        }

        let shape = |card: &CharacterCard| -> Vec<String> {
            let value = serde_json::to_value(card).unwrap();
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };
        let paul = view.characters.iter().find(|c| c.name == "Paul").unwrap();
        assert_eq!(shape(killer), shape(paul));
    }
}
