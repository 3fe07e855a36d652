//! JSON schemas for structured generation.

use serde_json::{json, Value};

use crate::backend::OutputSchema;

/// Fields of a generated case visible to the player.
pub const VISIBLE_FIELDS: [&str; 9] = [
    "victim_name",
    "time_of_death",
    "location_found",
    "murder_weapon",
    "cause_of_death",
    "crime_scene_details",
    "witnesses",
    "initial_clues",
    "npc_brief",
];

/// Fields of a generated case only shown once the game is over.
pub const REVEAL_FIELDS: [&str; 5] = [
    "killer_motive",
    "murder_method_details",
    "key_evidence",
    "red_herrings_explanation",
    "complete_timeline",
];

pub fn cast_schema() -> OutputSchema {
    OutputSchema::new(
        "cast",
        json!({
            "type": "object",
            "properties": {
                "characters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "role": {"type": "string", "enum": ["killer", "victim", "suspect"]},
                            "occupation": {"type": "string"},
                            "backstory": {"type": "string"}
                        },
                        "required": ["name", "role", "occupation", "backstory"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["characters"],
            "additionalProperties": false
        }),
    )
}

pub fn story_schema() -> OutputSchema {
    let fields: Vec<&str> = VISIBLE_FIELDS.iter().chain(&REVEAL_FIELDS).copied().collect();
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|field| (field.to_string(), json!({"type": "string"})))
        .collect();

    OutputSchema::new(
        "story",
        json!({
            "type": "object",
            "properties": properties,
            "required": fields,
            "additionalProperties": false
        }),
    )
}

pub fn assistant_schema() -> OutputSchema {
    OutputSchema::new(
        "assistant_move",
        json!({
            "type": "object",
            "properties": {
                "question": {"type": ["string", "null"]},
                "end_interview": {"type": "boolean"}
            },
            "required": ["question", "end_interview"],
            "additionalProperties": false
        }),
    )
}
