//! Game Session - the command surface the presentation layer drives.
//!
//! Every command validates against the current [`GameState`] first, then awaits the
//! backend, then commits. Nothing is written before the last await, so a failed or
//! dropped command leaves the session exactly as it was.

use case_rules::{
    AccusationOutcome, CharacterId, Clue, GameConfig, GameState, GameView, Page, Phase,
    RulesError, Speaker, Transcript, Turn,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::{GenerationBackend, GenerationError};
use crate::dialogue::{AssistantMove, DetectiveAssistant, DialogueEngine};
use crate::generator::ScenarioGenerator;
use crate::prompt_assembler::PromptAssembler;
use crate::snapshot::{SessionSnapshot, SnapshotError, SNAPSHOT_VERSION};

/// Unique identifier for a session. Also the snapshot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Why a session command failed. The session is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("cannot {action} while {state}")]
    InvalidTransition { action: String, state: String },

    #[error("unknown character: {0}")]
    UnknownCharacter(CharacterId),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Whether issuing the same command again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Generation(_))
    }
}

impl From<RulesError> for SessionError {
    fn from(error: RulesError) -> Self {
        match error {
            RulesError::InvalidTransition { action, state } => {
                SessionError::InvalidTransition { action, state }
            }
            RulesError::UnknownCharacter(id) => SessionError::UnknownCharacter(id),
            RulesError::Configuration(message) => SessionError::Configuration(message),
            // Only a generated case can break the structure of a case.
            RulesError::InvalidCase(message) => {
                SessionError::Generation(GenerationError::InvalidResponse(message))
            }
        }
    }
}

/// Result of asking the detective assistant to take over one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantExchange {
    /// The assistant asked and the character answered.
    Asked { question: Turn, answer: Turn },
    /// The assistant ended the interview.
    Concluded,
}

/// One player's game, from setup to the end.
pub struct GameSession {
    id: SessionId,
    backend: Arc<dyn GenerationBackend>,
    prompts: PromptAssembler,
    config: GameConfig,
    rng: StdRng,
    /// `None` while in setup.
    state: Option<GameState>,
}

impl GameSession {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: GameConfig) -> Self {
        Self {
            id: SessionId::new(),
            backend,
            prompts: PromptAssembler::default(),
            config,
            rng: StdRng::from_entropy(),
            state: None,
        }
    }

    /// Use the given prompt names.
    pub fn with_prompts(mut self, prompts: PromptAssembler) -> Self {
        self.prompts = prompts;
        self
    }

    /// Seed the randomness used to order the cast.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A new session in setup that shares this one's backend, prompts and config.
    ///
    /// A replacement case is generated into it while the current game stays untouched.
    pub fn fresh(&self) -> Self {
        Self {
            id: SessionId::new(),
            backend: Arc::clone(&self.backend),
            prompts: self.prompts.clone(),
            config: self.config.clone(),
            rng: StdRng::from_entropy(),
            state: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state
            .as_ref()
            .map(GameState::phase)
            .unwrap_or(Phase::Setup)
    }

    /// Everything the player may see. `None` while in setup.
    pub fn view(&self) -> Option<GameView> {
        self.state.as_ref().map(GameState::view)
    }

    /// The transcript with a character, if they have been interviewed.
    pub fn transcript(&self, id: CharacterId) -> Option<&Transcript> {
        self.state.as_ref().and_then(|s| s.transcript(id))
    }

    /// Generate a new case and open the investigation.
    pub async fn start_game(
        &mut self,
        environment: &str,
        cast_size: u32,
        guess_budget: u32,
    ) -> Result<(), SessionError> {
        if let Some(state) = &self.state {
            return Err(RulesError::transition(
                "start a new game",
                format!("in {}", state.phase()),
            )
            .into());
        }
        self.config
            .check_new_game(environment, cast_size, guess_budget)?;

        let environment = environment.trim();
        tracing::info!(
            session = %self.id,
            environment,
            cast_size,
            guess_budget,
            "Generating case"
        );
        let case = ScenarioGenerator::new(self.backend.as_ref(), &self.prompts)
            .generate(environment, cast_size, &mut self.rng)
            .await
            .map_err(generation_failed("start_game"))?;

        let state = GameState::new(case.cast, case.scenario, case.narration, guess_budget)?;
        self.state = Some(state);
        tracing::info!(session = %self.id, phase = %Phase::Investigation, "Game started");
        Ok(())
    }

    /// Pick a character to interview. Their introduction is generated the first time.
    pub async fn select_character(&mut self, id: CharacterId) -> Result<(), SessionError> {
        let state = self.game("interview a character")?;
        let introduction = if state.check_selectable(id)? {
            let character = state.cast().get(id).ok_or(SessionError::UnknownCharacter(id))?;
            let turn = DialogueEngine::new(self.backend.as_ref(), &self.prompts)
                .introduce(character, state.facts())
                .await
                .map_err(generation_failed("select_character"))?;
            Some(turn)
        } else {
            None
        };

        self.game_mut("interview a character")?
            .select_character(id, introduction)?;
        Ok(())
    }

    /// Put the player's question to the selected character and return the answer.
    pub async fn submit_question(&mut self, text: &str) -> Result<Turn, SessionError> {
        let text = text.trim();
        let state = self.game("ask a question")?;
        let (character, interview) = state.open_interview()?;
        if text.is_empty() {
            return Err(RulesError::transition("ask a question", "the question is empty").into());
        }

        let id = character.id;
        let question = Turn::now(Speaker::Player, text);
        let answer = DialogueEngine::new(self.backend.as_ref(), &self.prompts)
            .answer(character, state.facts(), &interview.transcript, text)
            .await
            .map_err(generation_failed("submit_question"))?;

        self.game_mut("ask a question")?
            .record_exchange(id, question, answer.clone())?;
        Ok(answer)
    }

    /// Let the detective assistant ask the next question, or end the interview.
    pub async fn request_assistant_question(&mut self) -> Result<AssistantExchange, SessionError> {
        let state = self.game("ask a question")?;
        let (character, interview) = state.open_interview()?;
        let id = character.id;

        let next = DetectiveAssistant::new(self.backend.as_ref(), &self.prompts)
            .next_move(character, state.facts(), &interview.transcript)
            .await
            .map_err(generation_failed("request_assistant_question"))?;

        match next {
            AssistantMove::Ask(text) => {
                let question = Turn::now(Speaker::Assistant, text);
                let answer = DialogueEngine::new(self.backend.as_ref(), &self.prompts)
                    .answer(character, state.facts(), &interview.transcript, &question.text)
                    .await
                    .map_err(generation_failed("request_assistant_question"))?;

                self.game_mut("ask a question")?.record_exchange(
                    id,
                    question.clone(),
                    answer.clone(),
                )?;
                Ok(AssistantExchange::Asked { question, answer })
            }
            AssistantMove::Conclude => {
                self.game_mut("end an interview")?.conclude_interview(id)?;
                tracing::info!(session = %self.id, character = %id, "Interview concluded");
                Ok(AssistantExchange::Concluded)
            }
        }
    }

    /// Leave the current interview. It can be resumed by selecting the character again.
    pub fn end_interview(&mut self) -> Result<CharacterId, SessionError> {
        Ok(self.game_mut("end an interview")?.end_interview()?)
    }

    pub fn set_phase(&mut self, phase: Phase) -> Result<(), SessionError> {
        let id = self.id;
        let state = self.game_mut("change phase")?;
        let from = state.phase();
        state.set_phase(phase)?;
        if from != phase {
            tracing::info!(session = %id, from = %from, to = %phase, "Phase changed");
        }
        Ok(())
    }

    pub fn navigate(&mut self, page: Page) -> Result<(), SessionError> {
        Ok(self.game_mut("navigate")?.navigate(page)?)
    }

    /// Accuse a character. Only allowed while guessing.
    pub fn accuse(&mut self, id: CharacterId) -> Result<AccusationOutcome, SessionError> {
        let session = self.id;
        let state = self.game_mut("accuse anyone")?;
        let outcome = state.accuse(id, Utc::now())?;

        tracing::info!(
            session = %session,
            accused = %id,
            correct = matches!(outcome, AccusationOutcome::Correct),
            guesses_left = state.guesses_left(),
            "Accusation made"
        );
        if let Some(result) = state.outcome() {
            tracing::info!(session = %session, outcome = ?result, "Game over");
        }
        Ok(outcome)
    }

    /// Pin a clue to the case notebook.
    pub fn record_clue(&mut self, text: &str) -> Result<Clue, SessionError> {
        let clue = self
            .game_mut("record a clue")?
            .record_clue(text, Utc::now())?;
        Ok(clue.clone())
    }

    /// Throw the current game away. The backend handle is kept.
    pub fn reset_session(&mut self) {
        tracing::info!(session = %self.id, "Session reset");
        self.state = None;
        self.id = SessionId::new();
    }

    /// Capture the session for storage.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.id, self.state.clone())
    }

    /// Replace the session with a stored one. Stored game state is checked when it is
    /// decoded, so a snapshot always carries a consistent game.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<(), SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        self.id = snapshot.session_id;
        self.state = snapshot.state;
        tracing::info!(session = %self.id, phase = %self.phase(), "Session restored");
        Ok(())
    }

    fn game(&self, action: &str) -> Result<&GameState, SessionError> {
        self.state
            .as_ref()
            .ok_or_else(|| RulesError::transition(action, format!("in {}", Phase::Setup)).into())
    }

    fn game_mut(&mut self, action: &str) -> Result<&mut GameState, SessionError> {
        self.state
            .as_mut()
            .ok_or_else(|| RulesError::transition(action, format!("in {}", Phase::Setup)).into())
    }
}

fn generation_failed(command: &'static str) -> impl FnOnce(GenerationError) -> SessionError {
    move |error| {
        tracing::warn!(command, error = %error, "Generation failed");
        SessionError::Generation(error)
    }
}
