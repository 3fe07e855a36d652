//! Scenario Generator - turns an environment description into a playable case.
//!
//! The pipeline is a fixed sequence of backend calls:
//! 1. **create_characters**: structured cast
//! 2. **create_story**: structured crime, visible facts and solution side by side
//! 3. **narrate**: free-text briefing on the crime scene
//!
//! Any failure aborts the whole pipeline. Nothing is returned half-built.

use case_rules::{
    Cast, Character, CrimeFacts, Role, RulesError, Scenario, Solution, Speaker, Turn,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::backend::{request_as, request_text, GenerationBackend, GenerationError};
use crate::prompt_assembler::PromptAssembler;

/// A fully generated case, ready to be played.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCase {
    pub cast: Cast,
    pub scenario: Scenario,
    /// Opening narration of the crime scene.
    pub narration: Turn,
}

#[derive(Debug, Deserialize)]
struct CharacterDraft {
    name: String,
    role: String,
    occupation: String,
    backstory: String,
}

impl CharacterDraft {
    fn into_character(self) -> Result<Character, GenerationError> {
        let role = Role::from_label(&self.role).ok_or_else(|| {
            GenerationError::schema("cast", format!("unknown role '{}'", self.role.trim()))
        })?;
        let occupation = self.occupation.trim();
        if occupation.is_empty() {
            return Err(GenerationError::schema(
                "cast",
                format!("{} has no occupation", self.name.trim()),
            ));
        }
        Ok(Character::new(self.name.trim())
            .with_role(role)
            .with_occupation(occupation)
            .with_backstory(self.backstory.trim()))
    }
}

#[derive(Debug, Deserialize)]
struct CastDraft {
    characters: Vec<CharacterDraft>,
}

#[derive(Debug, Deserialize)]
struct StoryDraft {
    #[serde(flatten)]
    facts: CrimeFacts,
    #[serde(flatten)]
    solution: Solution,
}

/// Runs the generation pipeline against a backend.
pub struct ScenarioGenerator<'a> {
    backend: &'a dyn GenerationBackend,
    prompts: &'a PromptAssembler,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(backend: &'a dyn GenerationBackend, prompts: &'a PromptAssembler) -> Self {
        Self { backend, prompts }
    }

    /// Generate a complete case. `rng` decides the order the cast is presented in.
    pub async fn generate<R: Rng + Send>(
        &self,
        environment: &str,
        cast_size: u32,
        rng: &mut R,
    ) -> Result<GeneratedCase, GenerationError> {
        let mut characters = self.create_characters(environment, cast_size).await?;
        characters.shuffle(rng);
        let cast = Cast::new(characters.clone())
            .map_err(|e| GenerationError::schema("cast", e))?;
        tracing::debug!(cast_size = cast.len(), "Cast created");

        let scenario = self.create_story(environment, &characters, &cast).await?;
        let narration = self.narrate(&scenario.facts).await?;

        Ok(GeneratedCase {
            cast,
            scenario,
            narration,
        })
    }

    async fn create_characters(
        &self,
        environment: &str,
        cast_size: u32,
    ) -> Result<Vec<Character>, GenerationError> {
        let request = self.prompts.cast_creation(environment, cast_size);
        let draft: CastDraft = request_as(self.backend, request).await?;

        if draft.characters.len() != cast_size as usize {
            return Err(GenerationError::schema(
                "cast",
                format!(
                    "expected {} characters, got {}",
                    cast_size,
                    draft.characters.len()
                ),
            ));
        }

        draft
            .characters
            .into_iter()
            .map(CharacterDraft::into_character)
            .collect()
    }

    async fn create_story(
        &self,
        environment: &str,
        characters: &[Character],
        cast: &Cast,
    ) -> Result<Scenario, GenerationError> {
        let request = self.prompts.story_creation(environment, characters);
        let draft: StoryDraft = request_as(self.backend, request).await?;
        Scenario::new(environment.trim(), draft.facts, draft.solution, cast)
            .map_err(story_error)
    }

    async fn narrate(&self, facts: &CrimeFacts) -> Result<Turn, GenerationError> {
        let text = request_text(self.backend, self.prompts.narration(facts)).await?;
        Ok(Turn::now(Speaker::Narrator, text))
    }
}

fn story_error(error: RulesError) -> GenerationError {
    match error {
        RulesError::InvalidCase(message) => GenerationError::schema("story", message),
        other => GenerationError::InvalidResponse(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn cast_json() -> Value {
        json!({
            "characters": [
                {"name": "Margot", "role": "victim", "occupation": "Founder",
                 "backstory": "Started the company in her flat."},
                {"name": "Henri", "role": "suspect", "occupation": "Office manager",
                 "backstory": "Knows every key."},
                {"name": "Lucie", "role": "Killer", "occupation": "Accountant",
                 "backstory": "Quiet and precise."},
                {"name": "Paul", "role": "suspect", "occupation": "Sales lead",
                 "backstory": "Argued with Margot."},
                {"name": "Sofia", "role": "suspect", "occupation": "Intern",
                 "backstory": "Stayed late."}
            ]
        })
    }

    pub fn story_json() -> Value {
        json!({
            "victim_name": "Margot",
            "time_of_death": "Around 23:00",
            "location_found": "The server room",
            "murder_weapon": "A network cable",
            "cause_of_death": "Strangulation",
            "crime_scene_details": "Racks hum around the body.",
            "witnesses": "The night guard heard a door slam.",
            "initial_clues": "A torn badge near the door.",
            "npc_brief": "Paul argued with Margot at lunch.",
            "killer_motive": "Margot discovered the embezzlement.",
            "murder_method_details": "Lucie waited behind the racks.",
            "key_evidence": "The torn badge is Lucie's",
            "red_herrings_explanation": "Paul's argument was about a bonus.",
            "complete_timeline": "22:30 Lucie badges in. 23:00 Margot dies."
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::backend::{MockGenerationBackend, Purpose};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn backend_with(cast: serde_json::Value, story: serde_json::Value) -> MockGenerationBackend {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate_structured()
            .returning(move |request| match request.purpose {
                Purpose::CastCreation => Ok(cast.clone()),
                Purpose::StoryCreation => Ok(story.clone()),
                other => panic!("unexpected structured request: {}", other),
            });
        backend
            .expect_generate_text()
            .returning(|_| Ok("Holmes, the body lies among the racks.".to_string()));
        backend
    }

    #[tokio::test]
    async fn test_generate_case() {
        let backend = backend_with(cast_json(), story_json());
        let prompts = PromptAssembler::default();
        let generator = ScenarioGenerator::new(&backend, &prompts);

        let case = generator
            .generate("Startup office in Paris", 5, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();

        assert_eq!(case.cast.len(), 5);
        assert_eq!(case.cast.victim().name, "Margot");
        let lucie = case.cast.find_by_name("Lucie").unwrap();
        assert!(case.cast.is_killer(lucie.id));
        let henri = case.cast.find_by_name("Henri").unwrap();
        assert_eq!(henri.occupation, "Office manager");
        assert_eq!(lucie.occupation, "Accountant");
        assert_eq!(case.scenario.facts.location_found, "The server room");
        assert_eq!(case.narration.speaker, Speaker::Narrator);
    }

    #[tokio::test]
    async fn test_cast_order_is_seeded_permutation() {
        let backend = backend_with(cast_json(), story_json());
        let prompts = PromptAssembler::default();
        let generator = ScenarioGenerator::new(&backend, &prompts);

        let names = |case: &GeneratedCase| -> Vec<String> {
            case.cast.iter().map(|c| c.name.clone()).collect()
        };
        let first = generator
            .generate("Office", 5, &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();
        let second = generator
            .generate("Office", 5, &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();
        assert_eq!(names(&first), names(&second));

        let mut sorted = names(&first);
        sorted.sort();
        assert_eq!(sorted, vec!["Henri", "Lucie", "Margot", "Paul", "Sofia"]);
    }

    #[tokio::test]
    async fn test_wrong_cast_size_fails() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate_structured()
            .times(1)
            .returning(|_| Ok(cast_json()));
        backend.expect_generate_text().never();
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 4, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::SchemaViolation { ref schema, .. }) if schema == "cast"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_killer_fails() {
        let mut cast = cast_json();
        cast["characters"][3]["role"] = "killer".into();
        let backend = backend_with(cast, story_json());
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(result, Err(GenerationError::SchemaViolation { .. })));
    }

    #[tokio::test]
    async fn test_every_character_needs_an_occupation() {
        let mut cast = cast_json();
        cast["characters"][2]["occupation"] = " ".into();
        let backend = backend_with(cast, story_json());
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::SchemaViolation { ref schema, .. }) if schema == "cast"
        ));
    }

    #[tokio::test]
    async fn test_unknown_role_fails() {
        let mut cast = cast_json();
        cast["characters"][1]["role"] = "Office manager".into();
        let backend = backend_with(cast, story_json());
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(result, Err(GenerationError::SchemaViolation { .. })));
    }

    #[tokio::test]
    async fn test_story_with_unknown_victim_fails() {
        let mut story = story_json();
        story["victim_name"] = "Someone else".into();
        let backend = backend_with(cast_json(), story);
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::SchemaViolation { ref schema, .. }) if schema == "story"
        ));
    }

    #[tokio::test]
    async fn test_story_missing_field_fails() {
        let mut story = story_json();
        story.as_object_mut().unwrap().remove("key_evidence");
        let backend = backend_with(cast_json(), story);
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(result, Err(GenerationError::SchemaViolation { .. })));
    }

    #[tokio::test]
    async fn test_blank_narration_fails() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate_structured()
            .returning(|request| match request.purpose {
                Purpose::CastCreation => Ok(cast_json()),
                _ => Ok(story_json()),
            });
        backend
            .expect_generate_text()
            .returning(|_| Ok("   ".to_string()));
        let prompts = PromptAssembler::default();

        let result = ScenarioGenerator::new(&backend, &prompts)
            .generate("Office", 5, &mut StdRng::seed_from_u64(1))
            .await;
        assert_eq!(result, Err(GenerationError::Empty(Purpose::Narration)));
    }
}
