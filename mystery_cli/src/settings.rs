//! Process configuration: `mystery.toml` plus environment overrides.

use anyhow::{bail, Context, Result};
use case_rules::GameConfig;
use mystery_core::{BackendConfig, PromptConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mystery.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub backend: BackendConfig,
    pub prompts: PromptConfig,
    /// Directory holding saved sessions.
    pub snapshot_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            backend: BackendConfig::default(),
            prompts: PromptConfig::default(),
            snapshot_dir: PathBuf::from("saves"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, `MYSTERY_CONFIG` or `mystery.toml`, then apply the
    /// environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var_os("MYSTERY_CONFIG").map(PathBuf::from));
        let mut settings = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Override settings from environment variables, looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("MYSTERY_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(model) = var("MYSTERY_MODEL") {
            self.backend.model = model;
        }
        if let Some(key) = var("MYSTERY_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.backend.api_key = Some(key);
        }
        if let Some(dir) = var("MYSTERY_SNAPSHOT_DIR") {
            self.snapshot_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate()?;
        if self.backend.timeout_secs == 0 {
            bail!("backend.timeout_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.game.cast_size.default, 5);
        assert_eq!(settings.backend.timeout_secs, 120);
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_toml_str(
            r#"
            snapshot_dir = "/tmp/cases"

            [game]
            default_environment = "A manor in Cornwall"

            [backend]
            model = "mistral-small"
            timeout_secs = 30

            [prompts]
            detective = "Hercule Poirot"
            "#,
        )
        .unwrap();

        assert_eq!(settings.game.default_environment, "A manor in Cornwall");
        assert_eq!(settings.game.guesses.default, 3);
        assert_eq!(settings.backend.model, "mistral-small");
        assert_eq!(settings.backend.timeout_secs, 30);
        assert_eq!(settings.prompts.detective, "Hercule Poirot");
        assert_eq!(settings.prompts.narrator, "Dr. John Watson");
        assert_eq!(settings.snapshot_dir, PathBuf::from("/tmp/cases"));
        settings.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MYSTERY_BASE_URL", "https://api.openai.com"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MYSTERY_SNAPSHOT_DIR", "/var/lib/mystery"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.backend.base_url, "https://api.openai.com");
        assert_eq!(settings.backend.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.backend.model, mystery_core::DEFAULT_MODEL);
        assert_eq!(settings.snapshot_dir, PathBuf::from("/var/lib/mystery"));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let settings = Settings::from_toml_str(
            r#"
            [game.cast_size]
            min = 6
            max = 4
            default = 5
            "#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::from_file(&dir.path().join("absent.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mystery.toml");
        std::fs::write(&path, "[backend]\nbase_url = \"http://gpu-box:8000\"\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.backend.base_url, "http://gpu-box:8000");
    }
}
