//! Configured limits for new games.

use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// An inclusive range with a default value inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl Bounds {
    pub fn new(min: u32, max: u32, default: u32) -> Self {
        Self { min, max, default }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Limits and defaults applied when a new game is started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Total number of characters, victim and killer included.
    pub cast_size: Bounds,
    /// Number of accusations the player may get wrong.
    pub guesses: Bounds,
    pub default_environment: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cast_size: Bounds::new(3, 8, 5),
            guesses: Bounds::new(1, 5, 3),
            default_environment: "Mistral office in Paris".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a configuration from TOML. Missing keys fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, RulesError> {
        let config: GameConfig = toml::from_str(source)
            .map_err(|e| RulesError::configuration(format!("invalid game config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every range is well formed and holds its default.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_bounds("cast_size", &self.cast_size)?;
        check_bounds("guesses", &self.guesses)?;
        // A case needs a killer, a victim and at least one innocent suspect.
        if self.cast_size.min < 3 {
            return Err(RulesError::configuration(
                "cast_size.min must be at least 3",
            ));
        }
        if self.guesses.min < 1 {
            return Err(RulesError::configuration("guesses.min must be at least 1"));
        }
        Ok(())
    }

    /// Validate the settings of a game about to start.
    pub fn check_new_game(
        &self,
        environment: &str,
        cast_size: u32,
        guess_budget: u32,
    ) -> Result<(), RulesError> {
        if environment.trim().is_empty() {
            return Err(RulesError::configuration("environment must not be empty"));
        }
        if !self.cast_size.contains(cast_size) {
            return Err(RulesError::configuration(format!(
                "cast size {} outside {}..={}",
                cast_size, self.cast_size.min, self.cast_size.max
            )));
        }
        if !self.guesses.contains(guess_budget) {
            return Err(RulesError::configuration(format!(
                "guess budget {} outside {}..={}",
                guess_budget, self.guesses.min, self.guesses.max
            )));
        }
        Ok(())
    }
}

fn check_bounds(name: &str, bounds: &Bounds) -> Result<(), RulesError> {
    if bounds.min > bounds.max {
        return Err(RulesError::configuration(format!(
            "{}: min {} is greater than max {}",
            name, bounds.min, bounds.max
        )));
    }
    if !bounds.contains(bounds.default) {
        return Err(RulesError::configuration(format!(
            "{}: default {} outside {}..={}",
            name, bounds.default, bounds.min, bounds.max
        )));
    }
    Ok(())
}
