//! Prompt templates.
//!
//! Every template only ever sees visible crime facts. The solution never reaches a
//! prompt.

use case_rules::{Character, CrimeFacts};

pub fn cast_creation(environment: &str, cast_size: u32) -> String {
    format!(
        "You design the cast of a murder mystery game.\n\
         \n\
         Setting:\n{environment}\n\
         \n\
         Create exactly {cast_size} characters that fit the setting.\n\
         - Exactly one character has the role \"killer\".\n\
         - Exactly one character has the role \"victim\".\n\
         - Every other character has the role \"suspect\".\n\
         - Every character, the killer and the victim included, has an occupation \
           describing their position in the setting (for example \"head chef\"). The \
           occupation never mentions the crime.\n\
         - Every name is unique.\n\
         \n\
         The killer must not be the obvious suspect. Give one or two innocent characters \
         loud, recent conflicts with the victim as red herrings, and give the killer a \
         hidden motive that only careful questioning uncovers. The killer should seem \
         ordinary, even sympathetic, and be surprising but logical in hindsight.\n\
         \n\
         Each backstory describes the character's focus, concerns and motives."
    )
}

pub fn story_creation(environment: &str, characters: &[Character]) -> String {
    let personas: Vec<String> = characters.iter().map(|c| c.persona()).collect();
    format!(
        "You write the central crime of a murder mystery game.\n\
         \n\
         Setting:\n{environment}\n\
         \n\
         Characters:\n{personas}\n\
         Describe where and when the victim was found, the weapon, the cause of death, \
         the state of the scene, witness statements and the first clues. Mix true clues \
         with red herrings and make the case solvable.\n\
         \n\
         Visible fields (victim_name, time_of_death, location_found, murder_weapon, \
         cause_of_death, crime_scene_details, witnesses, initial_clues, npc_brief) are \
         shown to the player at once. They must not reveal or hint at the killer. \
         victim_name must be exactly the name of the victim above.\n\
         \n\
         Reveal fields (killer_motive, murder_method_details, key_evidence, \
         red_herrings_explanation, complete_timeline) are shown only when the game ends. \
         Explain the motive, the method step by step, every piece of evidence against the \
         killer, why the innocent looked guilty, and a timeline from hours before the \
         murder to the discovery of the body.",
        personas = personas.join("\n"),
    )
}

pub fn narration(detective: &str, narrator: &str, facts: &CrimeFacts) -> String {
    format!(
        "You are {narrator}, trusted friend of the detective {detective}, who has just \
         arrived at the scene of a murder. In 100 words or less, brief {detective} on the \
         scene. Speak to {detective} directly, in a conversational tone.\n\
         \n\
         {scene}",
        scene = scene_block(facts),
    )
}

pub fn introduction(detective: &str, character: &Character, facts: &CrimeFacts) -> String {
    format!(
        "You play a character with this persona:\n{persona}\n\
         {detective} is interviewing you about this crime:\n\
         - Victim: {victim}\n\
         - Time of death: {time}\n\
         - Location: {location}\n\
         \n\
         Greet {detective} and introduce yourself, speaking to them directly. \
         Never state your role in the crime and never incriminate yourself.",
        persona = character.persona(),
        victim = facts.victim_name,
        time = facts.time_of_death,
        location = facts.location_found,
    )
}

pub fn answer(detective: &str, character: &Character, facts: &CrimeFacts) -> String {
    format!(
        "You play a character with this persona:\n{persona}\n\
         {detective} is interviewing you about this crime:\n\
         {scene}\n\
         \n\
         Everyone involved and their relationships:\n{brief}\n\
         \n\
         Answer the latest question as your character would, given your personality, \
         what you know about the crime, your relationships and your motives or alibis. \
         Stay in character, only reveal what your character would know, stay consistent \
         with the facts above, and lie if your character has reason to.",
        persona = character.persona(),
        scene = scene_block(facts),
        brief = facts.npc_brief,
    )
}

pub fn assistant_question(
    detective: &str,
    character: &Character,
    facts: &CrimeFacts,
    history: &str,
) -> String {
    format!(
        "You are {detective}, the renowned detective, interviewing {name} about the \
         murder of {victim}. It happened around {time} at {location}. The weapon was \
         {weapon} and the cause of death {cause}.\n\
         \n\
         Crime scene: {details}\n\
         Initial clues: {clues}\n\
         \n\
         Conversation with {name} so far:\n{history}\n\
         \n\
         Formulate one insightful question that moves the investigation forward, in the \
         inquisitive manner of {detective}. Put each sentence on its own line.\n\
         If {name} has nothing more of value to say, set end_interview to true and leave \
         question empty instead. Never do both.",
        name = character.name,
        victim = facts.victim_name,
        time = facts.time_of_death,
        location = facts.location_found,
        weapon = facts.murder_weapon,
        cause = facts.cause_of_death,
        details = facts.crime_scene_details,
        clues = facts.initial_clues,
    )
}

fn scene_block(facts: &CrimeFacts) -> String {
    format!(
        "Crime scene details:\n\
         - Victim: {}\n\
         - Time: {}\n\
         - Location: {}\n\
         - Weapon: {}\n\
         - Cause of death: {}\n\
         Scene description:\n{}",
        facts.victim_name,
        facts.time_of_death,
        facts.location_found,
        facts.murder_weapon,
        facts.cause_of_death,
        facts.crime_scene_details,
    )
}
