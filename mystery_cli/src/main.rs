//! `mystery` - play the murder mystery in a terminal.
//!
//! Usage: `mystery [config.toml]`

mod app;
mod commands;
mod render;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use mystery_core::{
    BoundedBackend, FileSnapshotStore, GameSession, GenerationBackend, OpenAiCompatibleClient,
    PromptAssembler, SessionError,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use commands::Command;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mystery_core=info,mystery_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    tracing::info!(
        base_url = %settings.backend.base_url,
        model = %settings.backend.model,
        snapshot_dir = %settings.snapshot_dir.display(),
        "Starting mystery"
    );

    let client = OpenAiCompatibleClient::new(settings.backend.clone())?;
    let backend: Arc<dyn GenerationBackend> = Arc::new(BoundedBackend::new(
        Arc::new(client),
        settings.backend.timeout(),
    ));
    let session = GameSession::new(backend, settings.game.clone())
        .with_prompts(PromptAssembler::new(settings.prompts.clone()));
    let store = FileSnapshotStore::new(settings.snapshot_dir.clone());
    let mut app = App::new(session, store, settings.prompts.detective.clone());

    println!("{}", "A murder has been committed.".bright_red().bold());
    println!(
        "{}",
        "Type /new to open a case, /help for every command.".bright_black()
    );

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(&app.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str())?;
                }
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(error) = app.handle(command).await {
                            report(&error);
                        }
                    }
                    Err(message) => render::error(&message),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }

    println!("{}", "Goodbye.".bright_black());
    Ok(())
}

fn report(error: &anyhow::Error) {
    render::error(&format!("{:#}", error));
    if error
        .downcast_ref::<SessionError>()
        .is_some_and(SessionError::is_retryable)
    {
        render::info("Nothing was changed. You can try again.");
    }
}
