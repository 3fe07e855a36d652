//! Terminal rendering of the game view.

use case_rules::{
    CharacterCard, ClueSource, GameOutcome, GameView, InterviewState, Reveal, Speaker, Turn,
};
use colored::Colorize;

pub fn scene(view: &GameView) {
    let facts = &view.facts;
    println!("{}", format!("== {} ==", view.environment).bright_yellow());
    if let Some(narration) = &view.narration {
        for line in narration.lines() {
            println!("{}", line.italic());
        }
        println!();
    }
    for (label, value) in [
        ("Victim", &facts.victim_name),
        ("Time of death", &facts.time_of_death),
        ("Found at", &facts.location_found),
        ("Weapon", &facts.murder_weapon),
        ("Cause of death", &facts.cause_of_death),
        ("Scene", &facts.crime_scene_details),
        ("Witnesses", &facts.witnesses),
        ("Initial clues", &facts.initial_clues),
    ] {
        println!("{} {}", format!("{}:", label).bold(), value);
    }
}

pub fn cast(view: &GameView) {
    for (n, card) in view.characters.iter().enumerate() {
        println!("{:>2}. {}", n + 1, card_line(card, view.selected == Some(card.id)));
    }
}

fn card_line(card: &CharacterCard, selected: bool) -> String {
    let name = if selected {
        card.name.bright_green().bold()
    } else {
        card.name.bold()
    };
    let occupation = match card.occupation.trim() {
        "" => String::new(),
        occupation => format!(" ({})", occupation),
    };
    let status = match (card.is_victim, card.interview) {
        (true, _) => "victim".red(),
        (false, InterviewState::NotStarted) => "not interviewed".bright_black(),
        (false, InterviewState::Ended) => "nothing more to say".bright_black(),
        (false, _) => "interviewed".cyan(),
    };
    format!("{}{} - {}", name, occupation, status)
}

pub fn turn(speaker_name: &str, detective: &str, turn: &Turn) {
    let label = match turn.speaker {
        Speaker::Character => speaker_name.bright_magenta(),
        Speaker::Player => detective.bright_cyan(),
        Speaker::Assistant => format!("{} (assistant)", detective).cyan(),
        Speaker::Narrator => "Narrator".bright_yellow(),
    };
    println!("[{}]", label);
    for line in turn.text.lines() {
        match turn.speaker {
            Speaker::Character => println!("{}", line.bright_blue()),
            Speaker::Narrator => println!("{}", line.italic()),
            Speaker::Player | Speaker::Assistant => println!("{}", line),
        }
    }
}

pub fn status(view: &GameView) {
    println!(
        "{} {}   {} {}   {} {}",
        "Phase:".bold(),
        view.phase,
        "Guesses left:".bold(),
        view.guesses_left,
        "Interviewed:".bold(),
        view.stats.characters_interviewed
    );
    if !view.clues.is_empty() {
        println!("{}", "Notebook:".bold());
        for clue in &view.clues {
            let source = match clue.source {
                ClueSource::CrimeScene => "crime scene".to_string(),
                ClueSource::Interview(id) => view
                    .characters
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "interview".to_string()),
            };
            println!("  - {} {}", clue.text, format!("[{}]", source).bright_black());
        }
    }
    for accusation in &view.accusations {
        let verdict = if accusation.was_correct {
            "correct".green()
        } else {
            "wrong".red()
        };
        println!("  accused {}: {}", accusation.accused_name, verdict);
    }
}

pub fn ending(view: &GameView) {
    match view.outcome {
        Some(GameOutcome::Win) => println!("{}", "You found the killer!".bright_green().bold()),
        Some(GameOutcome::Lose) => println!("{}", "You are out of guesses.".red().bold()),
        None => return,
    }
    if let Some(reveal) = &view.reveal {
        solution(reveal);
    }
    println!(
        "{}",
        format!(
            "Interviewed {} of {} suspects, {} guesses made, {} clues noted.",
            view.stats.characters_interviewed,
            view.stats.suspects,
            view.stats.guesses_made,
            view.stats.clues_found
        )
        .bright_black()
    );
}

fn solution(reveal: &Reveal) {
    println!("{} {}", "The killer was".bold(), reveal.killer.name.red().bold());
    let solution = &reveal.solution;
    for (label, value) in [
        ("Motive", &solution.killer_motive),
        ("Method", &solution.murder_method_details),
        ("Key evidence", &solution.key_evidence),
        ("Red herrings", &solution.red_herrings_explanation),
        ("Timeline", &solution.complete_timeline),
    ] {
        println!("{}\n{}\n", format!("{}:", label).bold(), value);
    }
}

pub fn info(message: &str) {
    println!("{}", message.bright_black());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}
