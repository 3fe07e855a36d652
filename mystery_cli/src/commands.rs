//! Parsing of REPL input lines.

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/new [cast] [guesses] [environment...]`
    New {
        cast_size: Option<u32>,
        guesses: Option<u32>,
        environment: Option<String>,
    },
    Scene,
    Cast,
    /// `/talk <n>`, 1-based position in the cast list.
    Talk(usize),
    Ask,
    Leave,
    Guess,
    Investigate,
    /// `/accuse <n>`, 1-based position in the cast list.
    Accuse(usize),
    Clue(String),
    Status,
    Save,
    Load(String),
    Reset,
    Help,
    Quit,
    /// Anything that is not a command is a question for the selected character.
    Question(String),
    Empty,
}

pub const HELP: &str = "\
/new [cast] [guesses] [environment...]  start a new case
/scene                                  show the crime scene
/cast                                   list the characters
/talk <n>                               interview character n
/ask                                    let the assistant ask the next question
/leave                                  leave the current interview
/guess                                  move on to accusations
/investigate                            go back to investigating
/accuse <n>                             accuse character n
/clue <text>                            pin a clue to the notebook
/status                                 show guesses, clues and accusations
/save                                   save this session
/load <session-id>                      resume a saved session
/reset                                  abandon the current case
/help                                   show this help
quit                                    leave the game
Anything else is asked to the character you are interviewing.";

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return Ok(Command::Quit);
    }
    let Some(body) = line.strip_prefix('/') else {
        return Ok(Command::Question(line.to_string()));
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "new" => parse_new(rest),
        "scene" => Command::Scene,
        "cast" => Command::Cast,
        "talk" => Command::Talk(position(rest)?),
        "ask" => Command::Ask,
        "leave" => Command::Leave,
        "guess" => Command::Guess,
        "investigate" => Command::Investigate,
        "accuse" => Command::Accuse(position(rest)?),
        "clue" if !rest.is_empty() => Command::Clue(rest.to_string()),
        "clue" => return Err("usage: /clue <text>".to_string()),
        "status" => Command::Status,
        "save" => Command::Save,
        "load" if !rest.is_empty() => Command::Load(rest.to_string()),
        "load" => return Err("usage: /load <session-id>".to_string()),
        "reset" => Command::Reset,
        "help" => Command::Help,
        "quit" => Command::Quit,
        other => return Err(format!("unknown command /{}, try /help", other)),
    };
    Ok(command)
}

fn parse_new(rest: &str) -> Command {
    let mut words = rest.split_whitespace().peekable();
    let cast_size = words.peek().and_then(|w| w.parse().ok());
    if cast_size.is_some() {
        words.next();
    }
    let guesses = words.peek().and_then(|w| w.parse().ok());
    if guesses.is_some() {
        words.next();
    }
    let environment = words.collect::<Vec<_>>().join(" ");

    Command::New {
        cast_size,
        guesses,
        environment: (!environment.is_empty()).then_some(environment),
    }
}

fn position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a character number, got '{}'", arg)),
    }
}
