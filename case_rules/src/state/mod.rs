//! Game state - the mutable root of one case once it has been generated.

mod clue;
mod interview;
mod view;

pub use clue::*;
pub use interview::*;
pub use view::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Cast, Character, CharacterId};
use crate::error::RulesError;
use crate::rules::{GameOutcome, Page, Phase};
use crate::scenario::{CrimeFacts, Scenario, Solution};
use crate::transcript::{Speaker, Transcript, Turn};

/// One accusation made by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accusation {
    pub accused: CharacterId,
    pub accused_name: String,
    pub was_correct: bool,
    pub timestamp: DateTime<Utc>,
}

/// What an accusation led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccusationOutcome {
    /// The killer was named. The game is won.
    Correct,
    /// Wrong suspect, but guesses remain.
    Incorrect { guesses_left: u32 },
    /// Wrong suspect and no guesses left. The game is lost.
    OutOfGuesses,
}

/// The complete state of a generated case at any point in time.
///
/// Every mutating method validates first and mutates last, so a returned error always
/// means nothing changed. Deserialized state is checked against the same rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredGameState")]
pub struct GameState {
    phase: Phase,
    page: Page,
    cast: Cast,
    scenario: Scenario,
    /// The scene narration; never part of a character transcript.
    scene_log: Transcript,
    interviews: HashMap<CharacterId, Interview>,
    selected: Option<CharacterId>,
    guess_budget: u32,
    guesses_left: u32,
    accusations: Vec<Accusation>,
    outcome: Option<GameOutcome>,
    clues: Vec<Clue>,
}

impl GameState {
    /// Open the investigation on a freshly generated case.
    pub fn new(
        cast: Cast,
        scenario: Scenario,
        narration: Turn,
        guess_budget: u32,
    ) -> Result<Self, RulesError> {
        if narration.speaker != Speaker::Narrator {
            return Err(RulesError::invalid_case(
                "the scene log must open with the narrator",
            ));
        }
        if guess_budget == 0 {
            return Err(RulesError::configuration("guess budget must be positive"));
        }

        let mut scene_log = Transcript::new();
        scene_log.push(narration);

        Ok(Self {
            phase: Phase::Investigation,
            page: Page::CrimeScene,
            cast,
            scenario,
            scene_log,
            interviews: HashMap::new(),
            selected: None,
            guess_budget,
            guesses_left: guess_budget,
            accusations: Vec::new(),
            outcome: None,
            clues: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn cast(&self) -> &Cast {
        &self.cast
    }

    pub fn facts(&self) -> &CrimeFacts {
        &self.scenario.facts
    }

    pub fn environment(&self) -> &str {
        &self.scenario.environment
    }

    pub fn scene_log(&self) -> &Transcript {
        &self.scene_log
    }

    pub fn selected(&self) -> Option<CharacterId> {
        self.selected
    }

    pub fn guess_budget(&self) -> u32 {
        self.guess_budget
    }

    pub fn guesses_left(&self) -> u32 {
        self.guesses_left
    }

    pub fn accusations(&self) -> &[Accusation] {
        &self.accusations
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// The transcript with a character, if they have been interviewed.
    pub fn transcript(&self, id: CharacterId) -> Option<&Transcript> {
        self.interviews.get(&id).map(|i| &i.transcript)
    }

    pub fn interview_state(&self, id: CharacterId) -> InterviewState {
        self.interviews
            .get(&id)
            .map(|i| i.state)
            .unwrap_or_default()
    }

    /// Number of characters spoken to so far.
    pub fn interviewed_count(&self) -> usize {
        self.interviews.len()
    }

    /// The reveal-only explanation. Only available once the game has ended.
    pub fn revealed_solution(&self) -> Option<&Solution> {
        self.is_over().then(|| self.scenario.solution())
    }

    /// The killer. Only available once the game has ended.
    pub fn revealed_killer(&self) -> Option<&Character> {
        self.is_over().then(|| self.cast.killer())
    }

    /// Move between investigation and guessing at the player's request.
    ///
    /// Requesting the current phase is a no-op, except once the game has ended.
    pub fn set_phase(&mut self, target: Phase) -> Result<(), RulesError> {
        self.ensure_not_over("change phase")?;
        if target == self.phase {
            return Ok(());
        }
        if !self.phase.allows_request(target) {
            return Err(RulesError::transition(
                format!("move to {}", target),
                format!("in {}", self.phase),
            ));
        }
        self.phase = target;
        Ok(())
    }

    /// Switch the investigation page.
    pub fn navigate(&mut self, page: Page) -> Result<(), RulesError> {
        self.ensure_not_over("navigate")?;
        if page == Page::Interview && self.selected.is_none() {
            return Err(RulesError::transition(
                "open the interview page",
                "no character is selected",
            ));
        }
        self.page = page;
        Ok(())
    }

    /// Check that a character may be picked for an interview.
    ///
    /// Returns whether the character still has to introduce itself.
    pub fn check_selectable(&self, id: CharacterId) -> Result<bool, RulesError> {
        self.ensure_phase(Phase::Investigation, "interview a character")?;
        let character = self
            .cast
            .get(id)
            .ok_or(RulesError::UnknownCharacter(id))?;
        if character.is_victim() {
            return Err(RulesError::transition(
                format!("interview {}", character.name),
                "they are the victim",
            ));
        }
        Ok(!self.interviews.contains_key(&id))
    }

    /// Select a character to interview.
    ///
    /// The first selection of a character must carry its introduction; later selections
    /// resume the existing interview and must not.
    pub fn select_character(
        &mut self,
        id: CharacterId,
        introduction: Option<Turn>,
    ) -> Result<(), RulesError> {
        let needs_introduction = self.check_selectable(id)?;
        match (needs_introduction, introduction) {
            (true, Some(turn)) => {
                check_speaker(&turn, Speaker::Character)?;
                let state = InterviewState::NotStarted
                    .apply(InterviewEvent::Introduce)?
                    .apply(InterviewEvent::Ready)?;
                let mut transcript = Transcript::new();
                transcript.push(turn);
                self.interviews.insert(
                    id,
                    Interview {
                        character: id,
                        state,
                        transcript,
                    },
                );
            }
            (false, None) => {}
            (true, None) => {
                return Err(RulesError::transition(
                    "start an interview",
                    "the character has not introduced themselves",
                ))
            }
            (false, Some(_)) => {
                return Err(RulesError::transition(
                    "introduce a character",
                    "they have already been introduced",
                ))
            }
        }

        self.selected = Some(id);
        self.page = Page::Interview;
        Ok(())
    }

    /// The interview currently open for a question.
    pub fn open_interview(&self) -> Result<(&Character, &Interview), RulesError> {
        self.ensure_phase(Phase::Investigation, "ask a question")?;
        let id = self.selected.ok_or_else(|| {
            RulesError::transition("ask a question", "no character is selected")
        })?;
        let character = self
            .cast
            .get(id)
            .ok_or(RulesError::UnknownCharacter(id))?;
        let interview = self.interviews.get(&id).ok_or_else(|| {
            RulesError::transition("ask a question", "the interview has not started")
        })?;
        if interview.state != InterviewState::AwaitingQuestion {
            return Err(RulesError::transition(
                format!("question {}", character.name),
                format!("the interview is {}", interview.state),
            ));
        }
        Ok((character, interview))
    }

    /// Record a question and its answer in one step.
    pub fn record_exchange(
        &mut self,
        id: CharacterId,
        question: Turn,
        answer: Turn,
    ) -> Result<(), RulesError> {
        if !question.speaker.is_interviewer() {
            return Err(RulesError::transition(
                "record a question",
                format!("the speaker is the {:?}", question.speaker).to_lowercase(),
            ));
        }
        check_speaker(&answer, Speaker::Character)?;

        let interview = self.interview_awaiting_question(id)?;
        interview.state = interview
            .state
            .apply(InterviewEvent::Ask)?
            .apply(InterviewEvent::Answer)?;
        interview.transcript.push(question);
        interview.transcript.push(answer);
        Ok(())
    }

    /// Close an interview after the detective assistant declared it exhausted.
    pub fn conclude_interview(&mut self, id: CharacterId) -> Result<(), RulesError> {
        let interview = self.interview_awaiting_question(id)?;
        interview.state = interview.state.apply(InterviewEvent::Conclude)?;
        Ok(())
    }

    /// Leave the current interview and go back to the character list.
    pub fn end_interview(&mut self) -> Result<CharacterId, RulesError> {
        self.ensure_phase(Phase::Investigation, "end an interview")?;
        let id = self.selected.take().ok_or_else(|| {
            RulesError::transition("end an interview", "no character is selected")
        })?;
        self.page = Page::Characters;
        Ok(id)
    }

    /// Pin a clue to the case notebook.
    ///
    /// Clues noted while a character is selected are attributed to that interview.
    pub fn record_clue(
        &mut self,
        text: impl Into<String>,
        discovered_at: DateTime<Utc>,
    ) -> Result<&Clue, RulesError> {
        self.ensure_not_over("record a clue")?;
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(RulesError::transition("record a clue", "the clue is empty"));
        }
        let source = match self.selected {
            Some(id) => ClueSource::Interview(id),
            None => ClueSource::CrimeScene,
        };
        self.clues.push(Clue {
            id: ClueId::new(),
            text,
            source,
            discovered_at,
        });
        Ok(&self.clues[self.clues.len() - 1])
    }

    /// Accuse a character of the murder.
    pub fn accuse(
        &mut self,
        id: CharacterId,
        timestamp: DateTime<Utc>,
    ) -> Result<AccusationOutcome, RulesError> {
        self.ensure_phase(Phase::Guessing, "accuse anyone")?;
        let accused = self
            .cast
            .get(id)
            .ok_or(RulesError::UnknownCharacter(id))?;
        if accused.is_victim() {
            return Err(RulesError::transition(
                format!("accuse {}", accused.name),
                "they are the victim",
            ));
        }

        let was_correct = self.cast.is_killer(id);
        let accusation = Accusation {
            accused: id,
            accused_name: accused.name.clone(),
            was_correct,
            timestamp,
        };
        self.accusations.push(accusation);

        if was_correct {
            self.finish(GameOutcome::Win);
            return Ok(AccusationOutcome::Correct);
        }

        self.guesses_left = self.guesses_left.saturating_sub(1);
        if self.guesses_left == 0 {
            self.finish(GameOutcome::Lose);
            Ok(AccusationOutcome::OutOfGuesses)
        } else {
            Ok(AccusationOutcome::Incorrect {
                guesses_left: self.guesses_left,
            })
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
        self.phase = Phase::Ended;
        self.selected = None;
    }

    fn interview_awaiting_question(
        &mut self,
        id: CharacterId,
    ) -> Result<&mut Interview, RulesError> {
        self.ensure_phase(Phase::Investigation, "continue an interview")?;
        if !self.cast.contains(id) {
            return Err(RulesError::UnknownCharacter(id));
        }
        let interview = self.interviews.get_mut(&id).ok_or_else(|| {
            RulesError::transition("continue an interview", "the interview has not started")
        })?;
        if interview.state != InterviewState::AwaitingQuestion {
            return Err(RulesError::transition(
                "continue an interview",
                format!("the interview is {}", interview.state),
            ));
        }
        Ok(interview)
    }

    fn ensure_phase(&self, expected: Phase, action: &str) -> Result<(), RulesError> {
        if self.phase != expected {
            return Err(RulesError::transition(action, format!("in {}", self.phase)));
        }
        Ok(())
    }

    fn ensure_not_over(&self, action: &str) -> Result<(), RulesError> {
        if self.is_over() {
            return Err(RulesError::transition(action, "the game has ended"));
        }
        Ok(())
    }
}

/// Game state as read back from storage, before it is checked.
#[derive(Deserialize)]
struct StoredGameState {
    phase: Phase,
    page: Page,
    cast: Cast,
    scenario: Scenario,
    scene_log: Transcript,
    interviews: HashMap<CharacterId, Interview>,
    selected: Option<CharacterId>,
    guess_budget: u32,
    guesses_left: u32,
    accusations: Vec<Accusation>,
    outcome: Option<GameOutcome>,
    clues: Vec<Clue>,
}

impl TryFrom<StoredGameState> for GameState {
    type Error = RulesError;

    fn try_from(stored: StoredGameState) -> Result<Self, Self::Error> {
        let state = Self {
            phase: stored.phase,
            page: stored.page,
            cast: stored.cast,
            scenario: stored.scenario,
            scene_log: stored.scene_log,
            interviews: stored.interviews,
            selected: stored.selected,
            guess_budget: stored.guess_budget,
            guesses_left: stored.guesses_left,
            accusations: stored.accusations,
            outcome: stored.outcome,
            clues: stored.clues,
        };
        state.validate()?;
        Ok(state)
    }
}

impl GameState {
    /// Check the invariants every reachable state satisfies.
    fn validate(&self) -> Result<(), RulesError> {
        let broken = |message: String| Err(RulesError::invalid_case(message));

        if self.phase == Phase::Setup {
            return broken("a generated case cannot be in setup".to_string());
        }
        if !self
            .cast
            .victim()
            .name
            .trim()
            .eq_ignore_ascii_case(self.scenario.facts.victim_name.trim())
        {
            return broken(format!(
                "scenario victim '{}' is not the cast's victim '{}'",
                self.scenario.facts.victim_name,
                self.cast.victim().name
            ));
        }
        match self.scene_log.turns().first() {
            Some(turn) if turn.speaker == Speaker::Narrator => {}
            _ => return broken("the scene log must open with the narrator".to_string()),
        }

        if self.guess_budget == 0 || self.guesses_left > self.guess_budget {
            return broken(format!(
                "{} guesses left out of a budget of {}",
                self.guesses_left, self.guess_budget
            ));
        }
        let mut wrong = 0;
        for (index, accusation) in self.accusations.iter().enumerate() {
            let accused = self
                .cast
                .get(accusation.accused)
                .ok_or(RulesError::UnknownCharacter(accusation.accused))?;
            if accused.is_victim() {
                return broken(format!("{} is the victim but was accused", accused.name));
            }
            if accusation.was_correct != self.cast.is_killer(accused.id) {
                return broken(format!("accusation of {} has the wrong verdict", accused.name));
            }
            if accusation.was_correct && index + 1 != self.accusations.len() {
                return broken("accusations continued after the killer was named".to_string());
            }
            if !accusation.was_correct {
                wrong += 1;
            }
        }
        if self.guess_budget - self.guesses_left != wrong {
            return broken(format!(
                "{} wrong accusations but {} guesses spent",
                wrong,
                self.guess_budget - self.guesses_left
            ));
        }

        let named_killer = self.accusations.last().is_some_and(|a| a.was_correct);
        if named_killer && self.guesses_left == 0 {
            return broken("the killer was named after the guesses ran out".to_string());
        }
        let expected_outcome = if named_killer {
            Some(GameOutcome::Win)
        } else if self.guesses_left == 0 {
            Some(GameOutcome::Lose)
        } else {
            None
        };
        if self.outcome != expected_outcome || self.is_over() != self.outcome.is_some() {
            return broken(format!(
                "outcome {:?} does not match phase {} with {} guesses left",
                self.outcome, self.phase, self.guesses_left
            ));
        }

        for (id, interview) in &self.interviews {
            let character = self
                .cast
                .get(*id)
                .ok_or(RulesError::UnknownCharacter(*id))?;
            if character.is_victim() {
                return broken(format!("{} is the victim but was interviewed", character.name));
            }
            if interview.character != *id {
                return broken(format!("interview with {} is filed under another id", character.name));
            }
            if !matches!(
                interview.state,
                InterviewState::AwaitingQuestion | InterviewState::Ended
            ) {
                return broken(format!(
                    "interview with {} is stuck {}",
                    character.name, interview.state
                ));
            }
            match interview.transcript.turns().first() {
                Some(turn) if turn.speaker == Speaker::Character => {}
                _ => {
                    return broken(format!(
                        "interview with {} does not open with an introduction",
                        character.name
                    ))
                }
            }
        }

        match self.selected {
            Some(_) if self.is_over() => {
                return broken("a character is selected after the game ended".to_string())
            }
            Some(id) if !self.interviews.contains_key(&id) => {
                return broken(format!("selected character {} was never interviewed", id))
            }
            None if self.page == Page::Interview => {
                return broken("the interview page is open with nobody selected".to_string())
            }
            _ => {}
        }

        for clue in &self.clues {
            if let ClueSource::Interview(id) = clue.source {
                if !self.interviews.contains_key(&id) {
                    return broken(format!("clue '{}' cites an unknown interview", clue.text));
                }
            }
        }
        Ok(())
    }
}

fn check_speaker(turn: &Turn, expected: Speaker) -> Result<(), RulesError> {
    if turn.speaker != expected {
        return Err(RulesError::transition(
            format!("record a {:?} turn", turn.speaker).to_lowercase(),
            format!("a {:?} turn was expected", expected).to_lowercase(),
        ));
    }
    Ok(())
}
