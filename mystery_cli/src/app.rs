//! Runs REPL commands against a game session.

use anyhow::{anyhow, Context, Result};
use case_rules::{AccusationOutcome, CharacterCard, GameView, Page, Phase};
use mystery_core::{
    AssistantExchange, FileSnapshotStore, GameSession, SessionId, SnapshotStore,
};

use crate::commands::{Command, HELP};
use crate::render;

pub struct App {
    session: GameSession,
    store: FileSnapshotStore,
    detective: String,
}

impl App {
    pub fn new(session: GameSession, store: FileSnapshotStore, detective: impl Into<String>) -> Self {
        Self {
            session,
            store,
            detective: detective.into(),
        }
    }

    /// The prompt shown before each input line.
    pub fn prompt(&self) -> String {
        let selected = self.session.view().and_then(|view| {
            view.selected
                .and_then(|id| view.characters.into_iter().find(|c| c.id == id))
                .map(|c| c.name)
        });
        match selected {
            Some(name) => format!("[{}] {}> ", self.session.phase(), name),
            None => format!("[{}]> ", self.session.phase()),
        }
    }

    pub async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::New {
                cast_size,
                guesses,
                environment,
            } => {
                let config = self.session.config().clone();
                let cast_size = cast_size.unwrap_or(config.cast_size.default);
                let guesses = guesses.unwrap_or(config.guesses.default);
                let environment =
                    environment.unwrap_or_else(|| config.default_environment.clone());
                config.check_new_game(&environment, cast_size, guesses)?;

                render::info(&format!(
                    "Generating a case with {} characters in \"{}\"...",
                    cast_size, environment
                ));
                // The running case is only replaced once the new one exists.
                let mut next = self.session.fresh();
                next.start_game(&environment, cast_size, guesses).await?;
                if self.session.phase() != Phase::Setup {
                    tracing::info!(previous = %self.session.id(), next = %next.id(), "Case replaced");
                }
                self.session = next;

                let view = self.view()?;
                render::scene(&view);
                println!();
                render::cast(&view);
            }
            Command::Scene => {
                self.session.navigate(Page::CrimeScene)?;
                render::scene(&self.view()?);
            }
            Command::Cast => {
                self.session.navigate(Page::Characters)?;
                render::cast(&self.view()?);
            }
            Command::Talk(n) => {
                let card = self.character(n)?;
                self.session.select_character(card.id).await?;
                if let Some(transcript) = self.session.transcript(card.id) {
                    for turn in transcript {
                        render::turn(&card.name, &self.detective, turn);
                    }
                }
            }
            Command::Ask => {
                let name = self.selected_name()?;
                match self.session.request_assistant_question().await? {
                    AssistantExchange::Asked { question, answer } => {
                        render::turn(&name, &self.detective, &question);
                        render::turn(&name, &self.detective, &answer);
                    }
                    AssistantExchange::Concluded => {
                        render::info(&format!("{} has nothing more of value to say.", name));
                    }
                }
            }
            Command::Question(text) => {
                let name = self.selected_name()?;
                let answer = self.session.submit_question(&text).await?;
                render::turn(&name, &self.detective, &answer);
            }
            Command::Leave => {
                self.session.end_interview()?;
                render::cast(&self.view()?);
            }
            Command::Guess => {
                self.session.set_phase(Phase::Guessing)?;
                render::info("Who did it? Use /accuse <n>, or /investigate to keep digging.");
                render::cast(&self.view()?);
            }
            Command::Investigate => {
                self.session.set_phase(Phase::Investigation)?;
                render::info("Back to the investigation.");
            }
            Command::Accuse(n) => {
                let card = self.character(n)?;
                match self.session.accuse(card.id)? {
                    AccusationOutcome::Incorrect { guesses_left } => render::error(&format!(
                        "{} is not the killer. {} guesses left.",
                        card.name, guesses_left
                    )),
                    AccusationOutcome::Correct | AccusationOutcome::OutOfGuesses => {
                        render::ending(&self.view()?);
                        render::info("Start another case with /new.");
                    }
                }
            }
            Command::Clue(text) => {
                let clue = self.session.record_clue(&text)?;
                render::info(&format!("Noted: {}", clue.text));
            }
            Command::Status => render::status(&self.view()?),
            Command::Save => {
                self.store.save(&self.session.snapshot()).await?;
                render::info(&format!("Saved session {}", self.session.id()));
            }
            Command::Load(id) => {
                let id: SessionId = id
                    .parse()
                    .with_context(|| format!("'{}' is not a session id", id))?;
                let snapshot = self.store.load(id).await?;
                self.session.restore(snapshot)?;
                match self.session.view() {
                    Some(view) => render::status(&view),
                    None => render::info("Session restored in setup. Start a case with /new."),
                }
            }
            Command::Reset => {
                self.session.reset_session();
                render::info("Case abandoned. Start another with /new.");
            }
            Command::Help => println!("{}", HELP),
            Command::Empty | Command::Quit => {}
        }
        Ok(())
    }

    fn view(&self) -> Result<GameView> {
        self.session
            .view()
            .ok_or_else(|| anyhow!("no case yet, start one with /new"))
    }

    fn character(&self, n: usize) -> Result<CharacterCard> {
        let view = self.view()?;
        let count = view.characters.len();
        view.characters
            .into_iter()
            .nth(n - 1)
            .ok_or_else(|| anyhow!("there is no character {} (1..={})", n, count))
    }

    fn selected_name(&self) -> Result<String> {
        let view = self.view()?;
        view.selected
            .and_then(|id| view.characters.into_iter().find(|c| c.id == id))
            .map(|c| c.name)
            .ok_or_else(|| anyhow!("talk to someone first with /talk <n>"))
    }
}
