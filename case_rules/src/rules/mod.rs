//! Game rules: phases, pages, outcomes and the configured limits of a case.

mod config;

pub use config::*;

use serde::{Deserialize, Serialize};

/// Top-level phase of a game.
///
/// Phases only move forward, except that `Investigation` and `Guessing` may alternate
/// any number of times before the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Investigation,
    Guessing,
    Ended,
}

impl Phase {
    /// Whether a player may request a move from `self` to `target`.
    ///
    /// `Setup -> Investigation` and `Guessing -> Ended` are driven by the game itself
    /// (generation and accusations) and are never player requests.
    pub fn allows_request(&self, target: Phase) -> bool {
        matches!(
            (self, target),
            (Phase::Investigation, Phase::Guessing) | (Phase::Guessing, Phase::Investigation)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Investigation => "investigation",
            Phase::Guessing => "guessing",
            Phase::Ended => "ended",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The page the presentation layer shows during the investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    CrimeScene,
    Characters,
    Interview,
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Lose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Setup < Phase::Investigation);
        assert!(Phase::Investigation < Phase::Guessing);
        assert!(Phase::Guessing < Phase::Ended);
    }

    #[test]
    fn test_phase_requests() {
        assert!(Phase::Investigation.allows_request(Phase::Guessing));
        assert!(Phase::Guessing.allows_request(Phase::Investigation));

        assert!(!Phase::Setup.allows_request(Phase::Investigation));
        assert!(!Phase::Guessing.allows_request(Phase::Ended));
        assert!(!Phase::Ended.allows_request(Phase::Investigation));
        assert!(!Phase::Investigation.allows_request(Phase::Setup));
    }
}
